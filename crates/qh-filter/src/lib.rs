//! Output filtering: extract the error-relevant lines from a tool run's
//! combined output, with context windows and a size cap.

use std::collections::BTreeSet;

use qh_config::OutputFilter;
use qh_core::QualhookError;

/// The subset of a run's output that survives filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredOutput {
    /// Surviving lines in source order.
    pub lines: Vec<String>,
    /// Any line matched an error pattern.
    pub has_errors: bool,
    /// The kept set exceeded `max_output` and was cut.
    pub truncated: bool,
    /// Line count of the input before filtering.
    pub total_lines: usize,
}

impl FilteredOutput {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Filter rules with patterns compiled once per invocation.
pub struct FilterRules {
    error_patterns: Vec<regex::Regex>,
    include_patterns: Vec<regex::Regex>,
    max_lines: usize,
    context_lines: usize,
}

impl FilterRules {
    /// Compile the configured patterns. Validation has already run at
    /// config load; this only turns patterns into matchers.
    pub fn from_config(config: &OutputFilter) -> Result<Self, QualhookError> {
        Ok(Self {
            error_patterns: compile_all(&config.error_patterns)?,
            include_patterns: compile_all(&config.include_patterns)?,
            max_lines: config.max_output,
            context_lines: config.context_lines,
        })
    }

    /// Keep-everything rules used when a command has no output filter
    /// configured.
    pub fn keep_all() -> Self {
        let defaults = OutputFilter::default();
        Self {
            error_patterns: Vec::new(),
            include_patterns: Vec::new(),
            max_lines: defaults.max_output,
            context_lines: defaults.context_lines,
        }
    }

    /// Apply the rules to a run's combined output.
    ///
    /// Error lines and include-anchored lines are kept together with
    /// `context_lines` of surrounding context on each side; overlapping
    /// windows merge through the set. With no patterns configured,
    /// everything is kept up to the cap.
    pub fn apply(&self, input: &str) -> FilteredOutput {
        if input.is_empty() {
            return FilteredOutput::default();
        }

        let lines: Vec<&str> = input.lines().collect();
        let total_lines = lines.len();

        let mut keep: BTreeSet<usize> = BTreeSet::new();
        let mut has_errors = false;

        if self.error_patterns.is_empty() && self.include_patterns.is_empty() {
            keep.extend(0..total_lines);
        } else {
            for (index, line) in lines.iter().enumerate() {
                let is_error = self.error_patterns.iter().any(|p| p.is_match(line));
                let is_anchor = is_error || self.include_patterns.iter().any(|p| p.is_match(line));
                if is_error {
                    has_errors = true;
                }
                if is_anchor {
                    let from = index.saturating_sub(self.context_lines);
                    let to = (index + self.context_lines).min(total_lines - 1);
                    keep.extend(from..=to);
                }
            }
        }

        let mut kept: Vec<String> = keep
            .into_iter()
            .map(|index| lines[index].to_string())
            .collect();
        let truncated = kept.len() > self.max_lines;
        if truncated {
            kept.truncate(self.max_lines);
        }

        FilteredOutput {
            lines: kept,
            has_errors,
            truncated,
            total_lines,
        }
    }
}

fn compile_all(patterns: &[qh_core::RegexPattern]) -> Result<Vec<regex::Regex>, QualhookError> {
    patterns.iter().map(|p| p.compile()).collect()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
