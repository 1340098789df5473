/// Exit code carried by an error kind under the reporting protocol.
///
/// Every variant here is a qualhook-owned failure (exit 1). Tool errors
/// (a child exiting with a configured error code, or output matching the
/// configured patterns) are not errors in this taxonomy; the reporter
/// derives them from `ExecResult` + `FilteredOutput` and signals exit 2.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QualhookError {
    #[error("no configuration file found (searched --config, QUALHOOK_CONFIG, .qualhook.json in CWD, project root, home)")]
    ConfigNotFound,

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("configuration validation failed: {0}")]
    ConfigValidation(String),

    #[error("command not found: '{0}'")]
    CommandNotFound(String),

    #[error("permission denied executing '{0}'")]
    PermissionDenied(String),

    #[error("command '{command}' timed out after {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("invalid working directory: {0}")]
    WorkingDirectory(String),

    #[error("security violation: {0}")]
    SecurityViolation(String),

    #[error("invalid hook input: {0}")]
    InvalidHookInput(String),

    #[error("execution canceled before dispatch")]
    Canceled,

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl QualhookError {
    /// True when this error came from a fired deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
