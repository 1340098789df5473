use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qualhook", version)]
#[command(about = "Quality-check hook between a coding agent and project tooling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit debug tracing to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Explicit config file path (overrides discovery)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured formatter
    Format {
        /// Extra arguments appended to the configured command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the configured linter
    Lint {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the configured type checker
    Typecheck {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the configured test runner
    Test {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Inspect the discovered configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },

    /// Any custom command name defined in the config's `commands` map
    #[command(external_subcommand)]
    Custom(Vec<String>),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Load the config and run the full security validation
    Validate,
    /// Print the validated config in canonical form
    Show,
}
