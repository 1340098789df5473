//! Path validation for working directories and configured path patterns.

use qh_core::QualhookError;

/// Absolute roots no quality command should ever operate from.
const FORBIDDEN_ROOTS: &[&str] = &["/etc", "/sys", "/proc", "/boot", "/usr/bin"];

/// Validate a path string before it is handed to the OS.
///
/// Rejects null bytes, `..` traversal, foreign drive prefixes on
/// non-Windows hosts, and absolute paths under forbidden system roots.
pub fn validate_path(path: &str) -> Result<(), QualhookError> {
    if path.contains('\0') {
        return Err(QualhookError::SecurityViolation(
            "path contains a null byte".into(),
        ));
    }

    let normalized = path.replace('\\', "/");
    if normalized
        .split('/')
        .any(|segment| segment == "..")
    {
        return Err(QualhookError::SecurityViolation(format!(
            "path '{path}' contains a '..' segment"
        )));
    }

    if cfg!(not(windows)) && has_drive_prefix(path) {
        return Err(QualhookError::SecurityViolation(format!(
            "Windows drive path '{path}' on a non-Windows host"
        )));
    }

    let lowered = normalized.to_ascii_lowercase();
    for root in FORBIDDEN_ROOTS {
        if lowered == *root || lowered.starts_with(&format!("{root}/")) {
            return Err(QualhookError::SecurityViolation(format!(
                "path '{path}' points into forbidden system root '{root}'"
            )));
        }
    }
    if lowered.contains("/windows/system32") || lowered.starts_with("c:/windows/system32") {
        return Err(QualhookError::SecurityViolation(format!(
            "path '{path}' points into System32"
        )));
    }

    Ok(())
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_relative_paths() {
        assert!(validate_path("frontend/src").is_ok());
        assert!(validate_path("./packages/api").is_ok());
    }

    #[test]
    fn test_accepts_ordinary_absolute_paths() {
        assert!(validate_path("/home/dev/project").is_ok());
        assert!(validate_path("/tmp/workdir").is_ok());
    }

    #[test]
    fn test_rejects_null_bytes() {
        assert!(validate_path("src\0/lib").is_err());
    }

    #[test]
    fn test_rejects_parent_traversal() {
        assert!(validate_path("../outside").is_err());
        assert!(validate_path("a/../b").is_err());
        assert!(validate_path("a\\..\\b").is_err());
    }

    #[test]
    fn test_dotdot_as_filename_prefix_is_allowed() {
        assert!(validate_path("a/..b/c").is_ok());
        assert!(validate_path("...dots").is_ok());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_rejects_drive_prefix_on_unix() {
        assert!(validate_path("C:\\projects\\x").is_err());
        assert!(validate_path("d:/stuff").is_err());
    }

    #[test]
    fn test_rejects_forbidden_roots() {
        for bad in ["/etc", "/etc/passwd", "/sys/kernel", "/proc/1", "/boot", "/usr/bin/env"] {
            assert!(validate_path(bad).is_err(), "expected rejection for {bad}");
        }
    }

    #[test]
    fn test_usr_share_is_not_forbidden() {
        assert!(validate_path("/usr/share/doc").is_ok());
    }

    #[cfg(windows)]
    #[test]
    fn test_rejects_system32() {
        assert!(validate_path("C:\\Windows\\System32\\cmd.exe").is_err());
    }
}
