use serde::{Deserialize, Serialize};

use crate::error::QualhookError;

/// Effective timeout applied when a command config says `0`.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;
/// Smallest accepted explicit timeout.
pub const MIN_TIMEOUT_MS: i64 = 100;
/// Largest accepted explicit timeout (one hour).
pub const MAX_TIMEOUT_MS: i64 = 3_600_000;

/// All quality checks passed.
pub const EXIT_SUCCESS: i32 = 0;
/// Qualhook-owned failure (config, spawn, validation, security).
pub const EXIT_QUALHOOK_ERROR: i32 = 1;
/// A configured tool reported issues worth repairing.
pub const EXIT_TOOL_ERROR: i32 = 2;

/// A regex plus its flag string as written in `.qualhook.json`.
///
/// Flags are a subset of `{i, m, s}` and are applied as an inline `(?...)`
/// group at compile time, so the stored pattern stays exactly what the user
/// wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexPattern {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flags: String,
}

impl RegexPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: String::new(),
        }
    }

    pub fn with_flags(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    /// Compile into a `regex::Regex`, applying the flag string.
    ///
    /// Unknown flag characters and non-compiling patterns produce a
    /// `ConfigValidation` error.
    pub fn compile(&self) -> Result<regex::Regex, QualhookError> {
        for ch in self.flags.chars() {
            if !matches!(ch, 'i' | 'm' | 's') {
                return Err(QualhookError::ConfigValidation(format!(
                    "unsupported regex flag '{ch}' in pattern '{}' (supported: i, m, s)",
                    self.pattern
                )));
            }
        }
        let full = if self.flags.is_empty() {
            self.pattern.clone()
        } else {
            format!("(?{}){}", self.flags, self.pattern)
        };
        regex::Regex::new(&full).map_err(|e| {
            QualhookError::ConfigValidation(format!("invalid regex '{}': {e}", self.pattern))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_plain_pattern() {
        let p = RegexPattern::new(r"error: \w+");
        let re = p.compile().unwrap();
        assert!(re.is_match("error: something"));
        assert!(!re.is_match("warning: something"));
    }

    #[test]
    fn test_compile_case_insensitive_flag() {
        let p = RegexPattern::with_flags("error", "i");
        let re = p.compile().unwrap();
        assert!(re.is_match("ERROR: broken"));
    }

    #[test]
    fn test_compile_multiline_and_dotall_flags() {
        let p = RegexPattern::with_flags("^fail.end$", "ms");
        let re = p.compile().unwrap();
        assert!(re.is_match("ok\nfail\nend"));
    }

    #[test]
    fn test_compile_rejects_unknown_flag() {
        let p = RegexPattern::with_flags("error", "x");
        let err = p.compile().unwrap_err();
        assert!(matches!(err, QualhookError::ConfigValidation(_)));
        assert!(err.to_string().contains("unsupported regex flag 'x'"));
    }

    #[test]
    fn test_compile_rejects_bad_pattern() {
        let p = RegexPattern::new("[unclosed");
        assert!(matches!(
            p.compile(),
            Err(QualhookError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_serde_omits_empty_flags() {
        let p = RegexPattern::new("error");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"pattern":"error"}"#);

        let back: RegexPattern = serde_json::from_str(r#"{"pattern":"error"}"#).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_serde_roundtrip_with_flags() {
        let p = RegexPattern::with_flags(r"^\d+ errors?", "im");
        let json = serde_json::to_string(&p).unwrap();
        let back: RegexPattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
