//! Executable and argument validation.

use std::path::Path;

use qh_core::QualhookError;

const MAX_COMMAND_LEN: usize = 255;

/// Characters that hand control to a shell if the command string ever
/// reaches one.
const INJECTION_MARKERS: &[char] = &[';', '|', '&', '$', '`', '>', '<', '\n'];

/// URL-encoded forms of `;` and `|`.
const ENCODED_MARKERS: &[&str] = &["%3b", "%7c"];

/// System roots that `curl`/`wget` must never write into.
const FORBIDDEN_OUTPUT_ROOTS: &[&str] = &["/etc", "/usr", "/bin", "/sbin", "/boot", "c:\\windows"];

/// Validate an executable name and its argument list.
///
/// When `whitelist` is given, the basename of the executable must be a
/// member (case-sensitive).
pub fn validate_command(
    command: &str,
    args: &[String],
    whitelist: Option<&[String]>,
) -> Result<(), QualhookError> {
    if command.is_empty() {
        return Err(QualhookError::SecurityViolation(
            "command name is empty".into(),
        ));
    }
    if command.len() > MAX_COMMAND_LEN {
        return Err(QualhookError::SecurityViolation(format!(
            "command name exceeds {MAX_COMMAND_LEN} characters"
        )));
    }
    if command.contains('\0') {
        return Err(QualhookError::SecurityViolation(
            "command name contains a null byte".into(),
        ));
    }
    if command.chars().all(|c| c == '/' || c == '\\') {
        return Err(QualhookError::SecurityViolation(
            "command name consists only of path separators".into(),
        ));
    }

    if let Some(allowed) = whitelist {
        let base = basename(command);
        if !allowed.iter().any(|a| a == base) {
            return Err(QualhookError::SecurityViolation(format!(
                "command '{base}' is not in the configured whitelist"
            )));
        }
    }

    scan_for_injection("command", command)?;
    for arg in args {
        scan_for_injection("argument", arg)?;
    }

    check_dangerous_patterns(command, args)
}

fn basename(command: &str) -> &str {
    Path::new(command)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(command)
}

fn scan_for_injection(what: &str, value: &str) -> Result<(), QualhookError> {
    if let Some(marker) = value.chars().find(|c| INJECTION_MARKERS.contains(c)) {
        let shown = if marker == '\n' {
            "\\n".to_string()
        } else {
            marker.to_string()
        };
        return Err(QualhookError::SecurityViolation(format!(
            "shell injection marker '{shown}' in {what} '{}'",
            value.replace('\n', "\\n")
        )));
    }
    let lowered = value.to_ascii_lowercase();
    for encoded in ENCODED_MARKERS {
        if lowered.contains(encoded) {
            return Err(QualhookError::SecurityViolation(format!(
                "encoded shell injection marker '{encoded}' in {what} '{value}'"
            )));
        }
    }
    Ok(())
}

/// Reject `rm -rf` shapes and `curl`/`wget` output redirection into
/// system roots.
fn check_dangerous_patterns(command: &str, args: &[String]) -> Result<(), QualhookError> {
    let base = basename(command);

    if base == "rm" {
        let combined = args
            .iter()
            .any(|a| a == "-rf" || a == "-fr" || a == "-rF" || a == "-Rf");
        let split = args.iter().any(|a| a == "-r" || a == "-R")
            && args.iter().any(|a| a == "-f" || a == "-F");
        if combined || split {
            return Err(QualhookError::SecurityViolation(
                "refusing recursive-force 'rm' in a quality command".into(),
            ));
        }
    }

    if base == "curl" || base == "wget" {
        let mut iter = args.iter().peekable();
        while let Some(arg) = iter.next() {
            let target = if arg == "-o" || arg == "--output" {
                iter.peek().map(|s| s.as_str())
            } else {
                arg.strip_prefix("--output=").or(arg.strip_prefix("-o="))
            };
            if let Some(path) = target {
                let normalized = path.to_ascii_lowercase().replace('\\', "/");
                let forbidden = FORBIDDEN_OUTPUT_ROOTS.iter().any(|root| {
                    normalized.starts_with(&root.to_ascii_lowercase().replace('\\', "/"))
                });
                if forbidden {
                    return Err(QualhookError::SecurityViolation(format!(
                        "'{base}' writing output to system path '{path}'"
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
