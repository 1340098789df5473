use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use qh_core::{QualhookError, RegexPattern};

use crate::migrate;

/// Root of a `.qualhook.json` document.
///
/// Command maps are `BTreeMap` so serialization is canonical (sorted keys)
/// without a separate normalization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Schema version, `MAJOR.MINOR`.
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub commands: BTreeMap<String, CommandConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathConfig>,
}

/// One logical quality command (`format`, `lint`, ... or any custom name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandConfig {
    /// Executable name, never empty after validation.
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Milliseconds; `0` means the 120 s process-wide default.
    #[serde(default)]
    pub timeout: i64,
    /// Shown above this command's error output in the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detection: Option<ErrorDetection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_filter: Option<OutputFilter>,
}

/// Rules labelling a finished run as a tool error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exit_codes: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<RegexPattern>,
}

/// Rules selecting the error-relevant subset of a run's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_patterns: Vec<RegexPattern>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_patterns: Vec<RegexPattern>,
    #[serde(default = "default_max_output")]
    pub max_output: usize,
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

fn default_max_output() -> usize {
    100
}

fn default_context_lines() -> usize {
    2
}

impl Default for OutputFilter {
    fn default() -> Self {
        Self {
            error_patterns: Vec::new(),
            include_patterns: Vec::new(),
            max_output: default_max_output(),
            context_lines: default_context_lines(),
        }
    }
}

/// Per-path command overrides for monorepo sub-projects.
///
/// An explicit `null` in `commands` removes the root's entry for that
/// logical name; absence inherits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathConfig {
    /// Relative glob pattern, e.g. `frontend/**`.
    pub path: String,
    /// Reserved for config inheritance; validated and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub commands: BTreeMap<String, Option<CommandConfig>>,
}

impl Config {
    /// Parse a config document, applying schema migrations as needed.
    ///
    /// The returned config is parsed but not yet validated; callers run
    /// [`Config::validate`] before using it.
    pub fn from_json_str(input: &str) -> Result<Self, QualhookError> {
        let mut value: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| QualhookError::ConfigInvalid(format!("not valid JSON: {e}")))?;
        migrate::default_registry().migrate_to_current(&mut value)?;
        serde_json::from_value(value)
            .map_err(|e| QualhookError::ConfigInvalid(format!("schema mismatch: {e}")))
    }

    /// Read and parse a config file.
    pub fn load_file(path: &Path) -> Result<Self, QualhookError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            QualhookError::ConfigInvalid(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Canonical serialization: pretty JSON with sorted command keys.
    pub fn to_canonical_json(&self) -> Result<String, QualhookError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| QualhookError::ConfigInvalid(format!("serialization failed: {e}")))
    }

    /// Run the full security validation over every command, pattern,
    /// timeout, and path entry.
    pub fn validate(&self) -> Result<(), QualhookError> {
        migrate::Version::parse_supported(&self.version)?;

        for (name, cmd) in &self.commands {
            validate_command_config(name, cmd)?;
        }

        for path_cfg in &self.paths {
            validate_path_config(path_cfg)?;
        }

        Ok(())
    }
}

fn validate_command_config(name: &str, cmd: &CommandConfig) -> Result<(), QualhookError> {
    if name.is_empty() {
        return Err(QualhookError::ConfigValidation(
            "logical command name is empty".into(),
        ));
    }
    qh_security::validate_command(&cmd.command, &cmd.args, None)?;
    qh_security::validate_timeout(cmd.timeout)?;

    if let Some(detection) = &cmd.error_detection {
        for pattern in &detection.patterns {
            qh_security::validate_regex(pattern)?;
        }
    }
    if let Some(filter) = &cmd.output_filter {
        for pattern in filter.error_patterns.iter().chain(&filter.include_patterns) {
            qh_security::validate_regex(pattern)?;
        }
    }
    Ok(())
}

fn validate_path_config(path_cfg: &PathConfig) -> Result<(), QualhookError> {
    if path_cfg.path.is_empty() {
        return Err(QualhookError::ConfigValidation(
            "path pattern is empty".into(),
        ));
    }
    if path_cfg.path.starts_with('/') {
        return Err(QualhookError::ConfigValidation(format!(
            "path pattern '{}' must be relative",
            path_cfg.path
        )));
    }
    qh_security::validate_path(&path_cfg.path)?;

    for (name, override_cmd) in &path_cfg.commands {
        if let Some(cmd) = override_cmd {
            validate_command_config(name, cmd)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
