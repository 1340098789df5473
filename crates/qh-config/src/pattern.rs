//! Path-pattern matching for `PathConfig` entries.
//!
//! Supported forms, in match order:
//! - exact equality
//! - trailing `/` (directory prefix)
//! - trailing `/**` (the prefix itself or anything under it)
//! - glob syntax: `*` one segment, `**` any segments, `?` one character,
//!   `[...]` character classes
//!
//! Specificity is the byte length of the literal prefix before the first
//! glob metacharacter; exact patterns score their full length.

use crate::config::PathConfig;

const GLOB_META: &[char] = &['*', '?', '['];

fn glob_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

fn glob_match(pattern: &str, path: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches_with(path, glob_options()))
        .unwrap_or(false)
}

/// Test whether a relative path matches a `PathConfig` pattern.
pub fn matches_path(pattern: &str, rel_path: &str) -> bool {
    if pattern == rel_path {
        return true;
    }

    if pattern.ends_with('/') {
        let trimmed = pattern.trim_end_matches('/');
        if rel_path == trimmed || rel_path.starts_with(pattern) {
            return true;
        }
    }

    if let Some(prefix) = pattern.strip_suffix("/**") {
        if prefix.contains(GLOB_META) {
            // Globby prefix: the "prefix itself" case needs a glob match.
            if glob_match(prefix, rel_path) {
                return true;
            }
        } else if rel_path == prefix || rel_path.starts_with(&format!("{prefix}/")) {
            return true;
        }
    }

    glob_match(pattern, rel_path)
}

/// Literal-prefix length used to rank competing patterns.
pub fn specificity(pattern: &str) -> usize {
    pattern.find(GLOB_META).unwrap_or(pattern.len())
}

/// Select the most specific matching `PathConfig` for a relative path.
///
/// Greatest literal-prefix length wins; ties go to the earliest entry.
/// Returns the index alongside the entry.
pub fn select_most_specific<'a>(
    paths: &'a [PathConfig],
    rel_path: &str,
) -> Option<(usize, &'a PathConfig)> {
    let mut best: Option<(usize, &PathConfig, usize)> = None;
    for (index, path_cfg) in paths.iter().enumerate() {
        if !matches_path(&path_cfg.path, rel_path) {
            continue;
        }
        let score = specificity(&path_cfg.path);
        match best {
            Some((_, _, best_score)) if score <= best_score => {}
            _ => best = Some((index, path_cfg, score)),
        }
    }
    best.map(|(index, path_cfg, _)| (index, path_cfg))
}
