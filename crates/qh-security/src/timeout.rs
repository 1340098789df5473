//! Timeout range validation.

use qh_core::{MAX_TIMEOUT_MS, MIN_TIMEOUT_MS, QualhookError};

/// Validate a configured timeout in milliseconds.
///
/// `0` means "use the process-wide default" and is always accepted.
pub fn validate_timeout(timeout_ms: i64) -> Result<(), QualhookError> {
    if timeout_ms == 0 {
        return Ok(());
    }
    if timeout_ms < 0 {
        return Err(QualhookError::ConfigValidation(format!(
            "timeout must not be negative (got {timeout_ms})"
        )));
    }
    if timeout_ms < MIN_TIMEOUT_MS {
        return Err(QualhookError::ConfigValidation(format!(
            "timeout {timeout_ms} ms is below the minimum of {MIN_TIMEOUT_MS} ms"
        )));
    }
    if timeout_ms > MAX_TIMEOUT_MS {
        return Err(QualhookError::ConfigValidation(format!(
            "timeout {timeout_ms} ms exceeds the maximum of {MAX_TIMEOUT_MS} ms"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_means_default() {
        assert!(validate_timeout(0).is_ok());
    }

    #[test]
    fn test_rejects_negative() {
        assert!(validate_timeout(-1).is_err());
        assert!(validate_timeout(i64::MIN).is_err());
    }

    #[test]
    fn test_lower_boundary() {
        assert!(validate_timeout(99).is_err());
        assert!(validate_timeout(100).is_ok());
    }

    #[test]
    fn test_upper_boundary() {
        assert!(validate_timeout(3_600_000).is_ok());
        assert!(validate_timeout(3_600_001).is_err());
    }
}
