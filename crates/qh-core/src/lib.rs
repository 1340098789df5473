//! Core types shared across the qualhook workspace.

pub mod error;
pub mod types;

pub use error::QualhookError;
pub use types::{
    DEFAULT_TIMEOUT_MS, EXIT_QUALHOOK_ERROR, EXIT_SUCCESS, EXIT_TOOL_ERROR, MAX_TIMEOUT_MS,
    MIN_TIMEOUT_MS, RegexPattern,
};
