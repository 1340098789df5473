//! Configuration model for `.qualhook.json`.
//!
//! Loading goes through three stages:
//! 1. **Discovery** (`discovery`): locate the config file via the flag /
//!    env / CWD / project-root / home search order.
//! 2. **Parsing + migration** (`config`, `migrate`): deserialize, check the
//!    schema version against the supported `1.0`, apply any registered
//!    migrations.
//! 3. **Validation** (`config::Config::validate`): run every command,
//!    pattern, timeout, and path through the security validator.
//!
//! After load the config is read-only; monorepo resolution and component
//! mapping clone-and-overwrite, never mutate.

pub mod config;
pub mod discovery;
pub mod migrate;
pub mod monorepo;
pub mod pattern;

pub use config::{CommandConfig, Config, ErrorDetection, OutputFilter, PathConfig};
pub use discovery::{CONFIG_FILE_NAME, QUALHOOK_CONFIG_ENV, discover_config};
pub use migrate::{MigrationRegistry, Version};
pub use monorepo::{load_for_monorepo, merged_commands};
pub use pattern::{matches_path, select_most_specific, specificity};
