//! Validation layer run at config load and again before every spawn.
//!
//! Each module owns one concern:
//! - `command`: executable + argument checks, shell-injection markers,
//!   dangerous command shapes, optional whitelist
//! - `path`: null bytes, `..` escapes, forbidden system roots
//! - `pattern`: regex length/group/backtracking limits, too-generic check
//! - `timeout`: accepted millisecond range
//! - `env`: secret deny-list, metacharacter values, `KEY=VALUE` merge
//!
//! All checks return `QualhookError` (exit code 1 under the report
//! protocol); none of them terminate the process.

pub mod command;
pub mod env;
pub mod path;
pub mod pattern;
pub mod timeout;

pub use command::validate_command;
pub use env::{merge_env, sanitize_env};
pub use path::validate_path;
pub use pattern::validate_regex;
pub use timeout::validate_timeout;
