use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod pipeline;

use cli::{Cli, Commands, ConfigCommands};
use qh_report::Report;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Tracing goes to stderr and never participates in the report
    // protocol; --debug raises the default filter.
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();

    let config_path = cli.config.as_deref();
    let report = match cli.command {
        Commands::Format { args } => pipeline::run_quality_command("format", &args, config_path).await,
        Commands::Lint { args } => pipeline::run_quality_command("lint", &args, config_path).await,
        Commands::Typecheck { args } => {
            pipeline::run_quality_command("typecheck", &args, config_path).await
        }
        Commands::Test { args } => pipeline::run_quality_command("test", &args, config_path).await,
        Commands::Config {
            cmd: ConfigCommands::Validate,
        } => pipeline::validate_config_command(config_path),
        Commands::Config {
            cmd: ConfigCommands::Show,
        } => pipeline::show_config_command(config_path),
        Commands::Custom(parts) => match parts.split_first() {
            Some((name, args)) => pipeline::run_quality_command(name, args, config_path).await,
            None => Report::from_error(&qh_core::QualhookError::ConfigValidation(
                "no command name given".into(),
            )),
        },
    };

    emit(report)
}

/// Write the report to the real streams and exit with its code.
fn emit(report: Report) -> ! {
    print!("{}", report.stdout);
    eprint!("{}", report.stderr);
    std::process::exit(report.exit_code);
}
