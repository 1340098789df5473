//! The execution pipeline: config -> hook input -> component mapping ->
//! parallel execution -> filtering -> report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use qh_config::{CommandConfig, Config};
use qh_core::QualhookError;
use qh_executor::{CancelToken, ExecOptions, ParallelCommand, ParallelExecutor, ProgressCallback};
use qh_filter::FilterRules;
use qh_hook::HookInput;
use qh_report::{ComponentOutcome, Report, build_report};

/// Run one logical quality command end to end and produce the report.
///
/// Never panics and never exits; every failure becomes a report with
/// exit code 1.
pub async fn run_quality_command(
    name: &str,
    extra_args: &[String],
    config_path: Option<&Path>,
) -> Report {
    match execute_pipeline(name, extra_args, config_path).await {
        Ok(report) => report,
        Err(error) => Report::from_error(&error),
    }
}

/// Load, validate, and monorepo-resolve the configuration.
fn load_validated(config_path: Option<&Path>) -> Result<(PathBuf, Config), QualhookError> {
    let config_file = qh_config::discover_config(config_path)?;
    let config = Config::load_file(&config_file)?;
    config.validate()?;
    Ok((config_file, config))
}

async fn execute_pipeline(
    name: &str,
    extra_args: &[String],
    config_path: Option<&Path>,
) -> Result<Report, QualhookError> {
    let (config_file, config) = load_validated(config_path)?;
    let config_dir = config_file
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let cwd = std::env::current_dir()
        .map_err(|e| QualhookError::WorkingDirectory(format!("cannot resolve CWD: {e}")))?;
    let config = qh_config::load_for_monorepo(&config, &config_dir, &cwd);

    let edited_files = hook_input_files(&config_dir)?;
    debug!(command = name, files = edited_files.len(), "mapping edited files");
    let groups = qh_mapper::map_files_to_components(&config, &edited_files);

    // Components whose merged map lacks this command are skipped; a
    // null override means "not configured here".
    let planned: Vec<(String, CommandConfig)> = groups
        .iter()
        .filter_map(|group| {
            group
                .commands
                .get(name)
                .map(|cfg| (group.path.clone(), cfg.clone()))
        })
        .collect();

    if planned.is_empty() {
        if !config.commands.contains_key(name) {
            return Err(QualhookError::ConfigValidation(format!(
                "no command named '{name}' is configured"
            )));
        }
        // Known command, but every matched component opted out.
        return Ok(build_report(&[]));
    }

    let commands = planned
        .iter()
        .map(|(path, cfg)| ParallelCommand {
            id: path.clone(),
            command: cfg.command.clone(),
            args: cfg
                .args
                .iter()
                .chain(extra_args)
                .cloned()
                .collect(),
            options: ExecOptions {
                working_dir: None,
                env: Vec::new(),
                inherit_env: true,
                timeout: (cfg.timeout > 0).then(|| Duration::from_millis(cfg.timeout as u64)),
            },
        })
        .collect();

    let progress: ProgressCallback = Arc::new(|completed, total, id| {
        debug!(completed, total, id, "component command finished");
    });
    let executor = ParallelExecutor::default();
    let result = executor
        .execute(commands, &CancelToken::new(), Some(progress))
        .await;

    let mut outcomes = Vec::with_capacity(planned.len());
    for (outcome, (component, cfg)) in result.outcomes.into_iter().zip(planned) {
        let rules = match &cfg.output_filter {
            Some(filter) => FilterRules::from_config(filter)?,
            None => FilterRules::keep_all(),
        };
        let combined = format!("{}{}", outcome.result.stdout, outcome.result.stderr);
        let filtered = rules.apply(&combined);

        outcomes.push(ComponentOutcome {
            component,
            command_name: name.to_string(),
            prompt: cfg.prompt.clone(),
            error_detection: cfg.error_detection.clone(),
            result: outcome.result,
            filtered,
        });
    }

    Ok(build_report(&outcomes))
}

/// Edited files from `CLAUDE_HOOK_INPUT`, relativized against the
/// config directory so they can match path patterns.
fn hook_input_files(config_dir: &Path) -> Result<Vec<String>, QualhookError> {
    let Some(input) = HookInput::from_env()? else {
        return Ok(Vec::new());
    };
    Ok(input
        .edited_files()
        .into_iter()
        .map(|file| relativize(&file, config_dir))
        .collect())
}

fn relativize(file: &str, base: &Path) -> String {
    match Path::new(file).strip_prefix(base) {
        Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
        Err(_) => file.replace('\\', "/"),
    }
}

/// `qualhook config validate`: load the discovered config and run the
/// full validation, reporting a one-line summary.
pub fn validate_config_command(config_path: Option<&Path>) -> Report {
    match load_validated(config_path) {
        Ok((config_file, config)) => Report {
            stdout: format!(
                "{}: configuration OK ({} commands, {} paths)\n",
                config_file.display(),
                config.commands.len(),
                config.paths.len()
            ),
            stderr: String::new(),
            exit_code: qh_core::EXIT_SUCCESS,
        },
        Err(error) => Report::from_error(&error),
    }
}

/// `qualhook config show`: print the validated config in canonical form
/// (sorted command keys, stable array order).
pub fn show_config_command(config_path: Option<&Path>) -> Report {
    let rendered = load_validated(config_path).and_then(|(_, config)| config.to_canonical_json());
    match rendered {
        Ok(json) => Report {
            stdout: format!("{json}\n"),
            stderr: String::new(),
            exit_code: qh_core::EXIT_SUCCESS,
        },
        Err(error) => Report::from_error(&error),
    }
}
