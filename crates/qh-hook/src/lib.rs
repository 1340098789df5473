//! Hook-input parsing: the structured record Claude Code hands to
//! qualhook after an editing action.
//!
//! In production the record arrives as raw JSON in the
//! `CLAUDE_HOOK_INPUT` environment variable; tests feed any byte stream.

use std::io::Read;

use serde::{Deserialize, Serialize};

use qh_core::QualhookError;

/// Environment variable carrying the raw hook record.
pub const CLAUDE_HOOK_INPUT_ENV: &str = "CLAUDE_HOOK_INPUT";

/// Tool names whose `input.file_path` field describes an edited file.
const FILE_EDIT_TOOLS: &[&str] = &["edit", "write", "multiedit"];

/// A hook record from the host agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookInput {
    pub session_id: String,
    /// Informational only.
    #[serde(default)]
    pub transcript_path: String,
    pub cwd: String,
    pub hook_event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<ToolUse>,
}

/// The tool invocation that triggered the hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUse {
    pub name: String,
    /// Raw tool input; shape depends on the tool.
    #[serde(default)]
    pub input: serde_json::Value,
}

impl HookInput {
    /// Parse a hook record from a JSON byte stream.
    pub fn from_reader(reader: impl Read) -> Result<Self, QualhookError> {
        let input: Self = serde_json::from_reader(reader)
            .map_err(|e| QualhookError::InvalidHookInput(format!("not valid JSON: {e}")))?;
        input.check_required_fields()?;
        Ok(input)
    }

    /// Parse a hook record from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self, QualhookError> {
        Self::from_reader(input.as_bytes())
    }

    /// Parse the hook record from `CLAUDE_HOOK_INPUT`, if present.
    ///
    /// An unset or blank variable means "no hook context" and yields
    /// `None`; the pipeline then runs on the root component.
    pub fn from_env() -> Result<Option<Self>, QualhookError> {
        let Some(raw) = std::env::var_os(CLAUDE_HOOK_INPUT_ENV) else {
            return Ok(None);
        };
        let raw = raw.to_string_lossy();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Self::from_json_str(&raw).map(Some)
    }

    fn check_required_fields(&self) -> Result<(), QualhookError> {
        for (field, value) in [
            ("session_id", &self.session_id),
            ("cwd", &self.cwd),
            ("hook_event_name", &self.hook_event_name),
        ] {
            if value.is_empty() {
                return Err(QualhookError::InvalidHookInput(format!(
                    "required field '{field}' is missing or empty"
                )));
            }
        }
        Ok(())
    }

    /// Extract the file paths edited by the recorded tool use.
    ///
    /// Unrecognized tool names and missing/empty `file_path` fields yield
    /// an empty sequence; the pipeline then runs on the root component.
    pub fn edited_files(&self) -> Vec<String> {
        let Some(tool_use) = &self.tool_use else {
            return Vec::new();
        };
        let name = tool_use.name.to_lowercase();
        if !FILE_EDIT_TOOLS.contains(&name.as_str()) {
            return Vec::new();
        }
        match tool_use.input.get("file_path").and_then(|v| v.as_str()) {
            Some(path) if !path.is_empty() => vec![path.to_string()],
            _ => Vec::new(),
        }
    }
}

/// Union of edited files across several hook records, deduplicated while
/// preserving first-seen order.
pub fn collect_edited_files(inputs: &[HookInput]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut files = Vec::new();
    for input in inputs {
        for file in input.edited_files() {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }
    files
}
