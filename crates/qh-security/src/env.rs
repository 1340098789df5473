//! Environment sanitization for child processes.

use tracing::debug;

/// Key substrings that must never be forwarded to quality commands.
const DENIED_KEY_SUBSTRINGS: &[&str] = &[
    "AWS_SECRET",
    "GITHUB_TOKEN",
    "API_KEY",
    "API_SECRET",
    "PASSWORD",
    "TOKEN",
    "LD_PRELOAD",
    "LD_LIBRARY_PATH",
];

/// Key prefixes that must never be forwarded.
const DENIED_KEY_PREFIXES: &[&str] = &["DYLD_"];

/// Value content that indicates shell interpolation or corruption.
fn value_is_unsafe(value: &str) -> bool {
    value.contains('\0')
        || value.contains('`')
        || value.contains("$(")
        || value.contains("${")
        || value.contains(';')
        || value.contains('|')
        || value.contains('&')
        || value.contains('\n')
}

fn key_is_denied(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    DENIED_KEY_SUBSTRINGS.iter().any(|s| upper.contains(s))
        || DENIED_KEY_PREFIXES.iter().any(|p| upper.starts_with(p))
}

/// Filter an inherited environment down to entries safe to forward.
pub fn sanitize_env(
    inherited: impl IntoIterator<Item = (String, String)>,
) -> Vec<(String, String)> {
    inherited
        .into_iter()
        .filter(|(key, value)| {
            if key_is_denied(key) {
                debug!(%key, "dropping denied environment key");
                return false;
            }
            if value_is_unsafe(value) {
                debug!(%key, "dropping environment entry with unsafe value");
                return false;
            }
            true
        })
        .collect()
}

/// Merge user-provided `KEY=VALUE` entries over a sanitized base.
///
/// Entries without `=`, with denied keys, or with unsafe values are
/// dropped. A passing entry overrides any inherited value for its key.
pub fn merge_env(base: Vec<(String, String)>, user_entries: &[String]) -> Vec<(String, String)> {
    let mut merged = base;
    for entry in user_entries {
        let Some((key, value)) = entry.split_once('=') else {
            debug!(%entry, "dropping malformed environment entry (no '=')");
            continue;
        };
        if key.is_empty() || key_is_denied(key) {
            debug!(key, "dropping user environment entry with denied key");
            continue;
        }
        if value_is_unsafe(value) {
            debug!(key, "dropping user environment entry with unsafe value");
            continue;
        }
        if let Some(existing) = merged.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value.to_string();
        } else {
            merged.push((key.to_string(), value.to_string()));
        }
    }
    merged
}
