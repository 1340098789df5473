//! Regex pattern validation.
//!
//! Patterns come from user configs and are matched against every line of
//! tool output, so the checks here bound both pathological runtime
//! (catastrophic backtracking shapes, group counts) and uselessness
//! (patterns so generic they match everything).

use qh_core::{QualhookError, RegexPattern};

const MAX_PATTERN_LEN: usize = 500;
const MAX_CAPTURING_GROUPS: usize = 10;

/// Representative tool-output lines used to detect too-generic patterns.
/// A pattern matching all but at most one of these would keep essentially
/// every line of real output.
const GENERIC_CORPUS: &[&str] = &[
    "error: cannot find module 'react'",
    "warning: unused variable `x`",
    "src/main.ts:42:7 - error TS2304",
    "All tests passed (34 total)",
    "Compiling qualhook v0.1.0",
    "    at Object.<anonymous> (index.js:1:1)",
    "npm WARN deprecated request@2.88.2",
    "Done in 2.45s.",
];

/// Validate a configured regex pattern.
pub fn validate_regex(pattern: &RegexPattern) -> Result<(), QualhookError> {
    let raw = pattern.pattern.as_str();

    if raw.len() > MAX_PATTERN_LEN {
        return Err(QualhookError::ConfigValidation(format!(
            "regex pattern exceeds {MAX_PATTERN_LEN} characters ({} given)",
            raw.len()
        )));
    }

    let groups = count_capturing_groups(raw);
    if groups > MAX_CAPTURING_GROUPS {
        return Err(QualhookError::ConfigValidation(format!(
            "regex pattern has {groups} capturing groups (max {MAX_CAPTURING_GROUPS})"
        )));
    }

    if has_backreference(raw) {
        return Err(QualhookError::ConfigValidation(format!(
            "regex pattern '{raw}' uses a back-reference"
        )));
    }

    if has_catastrophic_shape(raw) {
        return Err(QualhookError::ConfigValidation(format!(
            "regex pattern '{raw}' has a catastrophic-backtracking shape"
        )));
    }

    let compiled = pattern.compile()?;

    let hits = GENERIC_CORPUS.iter().filter(|l| compiled.is_match(l)).count();
    if hits >= GENERIC_CORPUS.len() - 1 {
        return Err(QualhookError::ConfigValidation(format!(
            "regex pattern '{raw}' is too generic (matches {hits}/{} sample lines)",
            GENERIC_CORPUS.len()
        )));
    }

    Ok(())
}

/// Count `(` groups that capture, skipping `(?...)` forms, escapes, and
/// character classes.
fn count_capturing_groups(pattern: &str) -> usize {
    let chars: Vec<char> = pattern.chars().collect();
    let mut count = 0;
    let mut escaped = false;
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if in_class {
            if c == ']' {
                in_class = false;
            }
        } else if c == '[' {
            in_class = true;
        } else if c == '(' && chars.get(i + 1) != Some(&'?') {
            count += 1;
        }
        i += 1;
    }
    count
}

/// Detect `\1`..`\9` back-references outside character classes.
fn has_backreference(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    if !in_class && next.is_ascii_digit() && *next != '0' {
                        return true;
                    }
                    i += 1;
                }
            }
            '[' => in_class = true,
            ']' => in_class = false,
            _ => {}
        }
        i += 1;
    }
    false
}

/// Detect quantified groups that are themselves quantified: `(X+)+`,
/// `(X*)*` and mixtures thereof, which explode on non-matching input.
fn has_catastrophic_shape(pattern: &str) -> bool {
    for known in ["(.*)*", "(.+)*", "(\\s*)*"] {
        if pattern.contains(known) {
            return true;
        }
    }

    let chars: Vec<char> = pattern.chars().collect();
    let mut escaped = false;
    for i in 0..chars.len() {
        if escaped {
            escaped = false;
            continue;
        }
        if chars[i] == '\\' {
            escaped = true;
            continue;
        }
        if chars[i] == ')'
            && i > 0
            && matches!(chars[i - 1], '+' | '*')
            && matches!(chars.get(i + 1), Some('+') | Some('*'))
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
