//! Error reporting: classify per-component outcomes, format the final
//! output, and decide the process exit code.
//!
//! The exit-code protocol is the contract with the calling agent:
//! - `0`: everything passed; stdout carries the success banner.
//! - `1`: qualhook itself failed (config, spawn, validation, security);
//!   stderr carries `[QUALHOOK ERROR]` diagnostics.
//! - `2`: the configured tools found issues; stderr carries the grouped,
//!   filtered error report for the agent to act on.

use qh_config::ErrorDetection;
use qh_core::{EXIT_QUALHOOK_ERROR, EXIT_SUCCESS, EXIT_TOOL_ERROR, QualhookError};
use qh_executor::ExecResult;
use qh_filter::FilteredOutput;

pub const QUALHOOK_ERROR_BANNER: &str = "[QUALHOOK ERROR]";
pub const SUCCESS_MESSAGE: &str = "All quality checks passed successfully";

/// Everything the reporter needs to know about one component's run of
/// one logical command.
#[derive(Debug, Clone)]
pub struct ComponentOutcome {
    /// Matched path pattern, or `.` for the root component.
    pub component: String,
    /// Logical command name (`format`, `lint`, ...).
    pub command_name: String,
    /// Configured prompt shown above this command's errors.
    pub prompt: Option<String>,
    /// Error-detection rules from the command config.
    pub error_detection: Option<ErrorDetection>,
    pub result: ExecResult,
    pub filtered: FilteredOutput,
}

impl ComponentOutcome {
    /// A qualhook-owned failure: spawn, validation, or timeout.
    pub fn is_qualhook_error(&self) -> bool {
        self.result.error.is_some()
    }

    /// A tool-owned failure per the configured detection rules.
    ///
    /// With rules: the exit code is in the configured set, a detection
    /// pattern matches the output, or the filter flagged error lines.
    /// Without rules: any non-zero exit.
    pub fn is_tool_error(&self) -> bool {
        if self.is_qualhook_error() {
            return false;
        }
        match &self.error_detection {
            Some(detection) => {
                detection.exit_codes.contains(&self.result.exit_code)
                    || self.detection_pattern_matches(detection)
                    || self.filtered.has_errors
            }
            None => self.result.exit_code != 0,
        }
    }

    fn detection_pattern_matches(&self, detection: &ErrorDetection) -> bool {
        if detection.patterns.is_empty() {
            return false;
        }
        let matchers: Vec<_> = detection
            .patterns
            .iter()
            .filter_map(|p| p.compile().ok())
            .collect();
        self.result
            .stdout
            .lines()
            .chain(self.result.stderr.lines())
            .any(|line| matchers.iter().any(|re| re.is_match(line)))
    }

    /// Output to show for this component: filtered lines, falling back
    /// to raw stderr, then raw stdout, so tools that emit errors to an
    /// unexpected stream are not silenced.
    fn display_output(&self) -> String {
        let mut text = if !self.filtered.is_empty() {
            self.filtered.text()
        } else if !self.result.stderr.trim().is_empty() {
            self.result.stderr.trim_end().to_string()
        } else {
            self.result.stdout.trim_end().to_string()
        };
        if self.filtered.truncated {
            text.push_str(&format!(
                "\n(output truncated; {} lines before filtering)",
                self.filtered.total_lines
            ));
        }
        text
    }
}

/// Final output of a qualhook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl Report {
    /// Report for a failure that happened before any command ran
    /// (config discovery, parsing, validation).
    pub fn from_error(error: &QualhookError) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{QUALHOOK_ERROR_BANNER} {error}\n"),
            exit_code: EXIT_QUALHOOK_ERROR,
        }
    }
}

/// Default prompt for a logical command with no configured prompt.
pub fn default_prompt(command_name: &str) -> &'static str {
    match command_name {
        "format" => "Fix the formatting issues below:",
        "lint" => "Fix the linting errors below:",
        "typecheck" => "Fix the type errors below:",
        "test" => "Fix the failing tests below:",
        _ => "Fix the following errors:",
    }
}

/// Build the final report from every component outcome of an invocation.
pub fn build_report(outcomes: &[ComponentOutcome]) -> Report {
    let qualhook_errors: Vec<&ComponentOutcome> = outcomes
        .iter()
        .filter(|o| o.is_qualhook_error())
        .collect();
    if !qualhook_errors.is_empty() {
        let mut stderr = String::new();
        for outcome in qualhook_errors {
            if let Some(error) = &outcome.result.error {
                stderr.push_str(&format!("{QUALHOOK_ERROR_BANNER} {error}\n"));
            }
        }
        return Report {
            stdout: String::new(),
            stderr,
            exit_code: EXIT_QUALHOOK_ERROR,
        };
    }

    let failing: Vec<&ComponentOutcome> =
        outcomes.iter().filter(|o| o.is_tool_error()).collect();
    if failing.is_empty() {
        return Report {
            stdout: format!("{SUCCESS_MESSAGE}\n"),
            stderr: String::new(),
            exit_code: EXIT_SUCCESS,
        };
    }

    Report {
        stdout: String::new(),
        stderr: format_tool_errors(&failing),
        exit_code: EXIT_TOOL_ERROR,
    }
}

/// Group failing components by logical command and render each group
/// under its prompt.
fn format_tool_errors(failing: &[&ComponentOutcome]) -> String {
    // Group order follows first occurrence.
    let mut groups: Vec<(&str, Vec<&ComponentOutcome>)> = Vec::new();
    for &outcome in failing {
        match groups
            .iter_mut()
            .find(|(name, _)| *name == outcome.command_name)
        {
            Some((_, members)) => members.push(outcome),
            None => groups.push((outcome.command_name.as_str(), vec![outcome])),
        }
    }

    let mut out = String::new();
    for (command_name, members) in groups {
        let prompt = members[0]
            .prompt
            .as_deref()
            .unwrap_or_else(|| default_prompt(command_name));
        out.push_str(prompt);
        out.push('\n');

        if members.len() == 1 {
            out.push_str(&members[0].display_output());
            out.push('\n');
        } else {
            for member in members {
                out.push_str(&format!("--- {} ---\n", member.component));
                out.push_str(&member.display_output());
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string() + "\n"
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
