use super::*;
use qh_core::RegexPattern;

fn rules(errors: &[&str], includes: &[&str], max: usize, context: usize) -> FilterRules {
    let config = OutputFilter {
        error_patterns: errors.iter().map(|p| RegexPattern::new(*p)).collect(),
        include_patterns: includes.iter().map(|p| RegexPattern::new(*p)).collect(),
        max_output: max,
        context_lines: context,
    };
    FilterRules::from_config(&config).unwrap()
}

fn numbered(count: usize) -> String {
    (1..=count)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_empty_input_yields_empty_output() {
    let output = rules(&["error"], &[], 100, 2).apply("");
    assert!(output.lines.is_empty());
    assert!(!output.has_errors);
    assert!(!output.truncated);
    assert_eq!(output.total_lines, 0);
}

#[test]
fn test_error_line_kept_with_context() {
    let input = "one\ntwo\nerror: broken\nfour\nfive\nsix";
    let output = rules(&["error"], &[], 100, 1).apply(input);
    assert_eq!(output.lines, vec!["two", "error: broken", "four"]);
    assert!(output.has_errors);
    assert_eq!(output.total_lines, 6);
}

#[test]
fn test_context_clamped_at_boundaries() {
    let input = "error at start\nmid\nerror at end";
    let output = rules(&["error"], &[], 100, 5).apply(input);
    assert_eq!(output.lines.len(), 3);
}

#[test]
fn test_overlapping_windows_merge() {
    let input = "a\nerror one\nb\nerror two\nc";
    let output = rules(&["error"], &[], 100, 1).apply(input);
    // Windows [0..=2] and [2..=4] merge; each line appears once.
    assert_eq!(output.lines, vec!["a", "error one", "b", "error two", "c"]);
}

#[test]
fn test_include_patterns_expand_keep_set_without_flagging_errors() {
    let input = "summary: 3 problems\nok line\nerror: bad";
    let output = rules(&["error:"], &["problems"], 100, 0).apply(input);
    assert_eq!(output.lines, vec!["summary: 3 problems", "error: bad"]);
    assert!(output.has_errors);

    let include_only = rules(&[], &["problems"], 100, 0).apply(input);
    assert_eq!(include_only.lines, vec!["summary: 3 problems"]);
    assert!(!include_only.has_errors);
}

#[test]
fn test_no_patterns_keeps_everything_up_to_cap() {
    let output = rules(&[], &[], 100, 2).apply(&numbered(10));
    assert_eq!(output.lines.len(), 10);
    assert!(!output.has_errors);
    assert!(!output.truncated);

    let capped = rules(&[], &[], 5, 2).apply(&numbered(10));
    assert_eq!(capped.lines.len(), 5);
    assert_eq!(capped.lines[0], "line 1");
    assert!(capped.truncated);
    assert_eq!(capped.total_lines, 10);
}

#[test]
fn test_truncation_keeps_first_max_lines() {
    let input = (1..=20)
        .map(|i| format!("error {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let output = rules(&["error"], &[], 3, 0).apply(&input);
    assert_eq!(output.lines, vec!["error 1", "error 2", "error 3"]);
    assert!(output.truncated);
    assert_eq!(output.total_lines, 20);
}

#[test]
fn test_no_matches_yields_empty_keep_set() {
    let output = rules(&["error"], &[], 100, 2).apply("all\nfine\nhere");
    assert!(output.lines.is_empty());
    assert!(!output.has_errors);
    assert!(!output.truncated);
    assert_eq!(output.total_lines, 3);
}

#[test]
fn test_flagged_patterns_respected() {
    let config = OutputFilter {
        error_patterns: vec![RegexPattern::with_flags("FAIL", "i")],
        include_patterns: vec![],
        max_output: 100,
        context_lines: 0,
    };
    let filter = FilterRules::from_config(&config).unwrap();
    let output = filter.apply("test ok\ntest failed badly");
    assert_eq!(output.lines, vec!["test failed badly"]);
}

#[test]
fn test_filter_is_idempotent() {
    let filter = rules(&["error"], &[], 100, 1);
    let input = "a\nerror: x\nb\nc\nerror: y\nd";
    let first = filter.apply(input);
    let second = filter.apply(&first.text());
    assert_eq!(first.lines, second.lines);
    assert_eq!(first.has_errors, second.has_errors);
}

#[test]
fn test_keep_all_rules() {
    let output = FilterRules::keep_all().apply("one\ntwo");
    assert_eq!(output.lines, vec!["one", "two"]);
    assert!(!output.has_errors);
}

#[test]
fn test_kept_lines_never_exceed_cap() {
    for max in [1, 3, 7, 100] {
        for input_len in [0, 1, 5, 50] {
            let filter = rules(&["line"], &[], max, 2);
            let output = filter.apply(&numbered(input_len));
            assert!(
                output.lines.len() <= max,
                "max={max} input_len={input_len} kept={}",
                output.lines.len()
            );
            assert_eq!(output.total_lines, input_len);
        }
    }
}

#[test]
fn test_every_kept_line_sits_in_a_match_window() {
    let context = 2usize;
    let input = (0..40)
        .map(|i| {
            if i % 9 == 0 {
                format!("error at {i}")
            } else {
                format!("noise {i}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let output = rules(&["error"], &[], 100, context).apply(&input);

    let error_indices: Vec<usize> = (0..40).filter(|i| i % 9 == 0).collect();
    for line in &output.lines {
        let index: usize = line
            .rsplit(' ')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        let in_window = error_indices
            .iter()
            .any(|e| index >= e.saturating_sub(context) && index <= e + context);
        assert!(in_window, "kept line {index} outside every window");
    }
}
