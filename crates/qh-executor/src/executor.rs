//! Single-command execution with capture, timeout, and cleanup.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use qh_core::{DEFAULT_TIMEOUT_MS, QualhookError};

/// Options for one subprocess run.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Validated and absolutized before spawn; `None` inherits the CWD.
    pub working_dir: Option<PathBuf>,
    /// User `KEY=VALUE` entries merged over the (sanitized) base env.
    pub env: Vec<String>,
    /// Start from the process environment instead of an empty one.
    pub inherit_env: bool,
    /// Effective deadline; `None` uses the 120 s default.
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    pub fn inheriting() -> Self {
        Self {
            inherit_env: true,
            ..Self::default()
        }
    }

    fn effective_timeout(&self) -> Duration {
        self.timeout
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

/// Captured outcome of one subprocess run.
///
/// `exit_code == -1` marks a spawn/validation failure and always comes
/// with a typed error; `timed_out` always comes with a `Timeout` error.
/// A non-zero exit from a child that ran is NOT an error here; that
/// classification belongs to the reporter.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
    pub error: Option<QualhookError>,
}

impl ExecResult {
    pub(crate) fn failure(error: QualhookError) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            timed_out: false,
            error: Some(error),
        }
    }

    pub(crate) fn canceled() -> Self {
        Self::failure(QualhookError::Canceled)
    }

    /// True when the run failed for qualhook-owned reasons (spawn,
    /// validation, timeout) rather than by the tool's own verdict.
    pub fn has_execution_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Execute a command and capture its output.
pub async fn execute(command: &str, args: &[String], options: &ExecOptions) -> ExecResult {
    run(command, args, options, None).await
}

/// Shared body for the buffered and streaming variants.
pub(crate) async fn run(
    command: &str,
    args: &[String],
    options: &ExecOptions,
    sinks: Option<(crate::streaming::SharedSink, crate::streaming::SharedSink)>,
) -> ExecResult {
    if let Err(err) = qh_security::validate_command(command, args, None) {
        return ExecResult::failure(err);
    }

    let working_dir = match resolve_working_dir(options) {
        Ok(dir) => dir,
        Err(err) => return ExecResult::failure(err),
    };

    // Resolve bare command names against PATH up front: a clean
    // CommandNotFound classification, and the spawn stays correct even
    // when the child env carries no PATH of its own.
    let program = if command.contains(['/', '\\']) {
        PathBuf::from(command)
    } else {
        match which::which(command) {
            Ok(path) => path,
            Err(_) => {
                return ExecResult::failure(QualhookError::CommandNotFound(command.to_string()));
            }
        }
    };

    let base_env = if options.inherit_env {
        qh_security::sanitize_env(std::env::vars())
    } else {
        Vec::new()
    };
    let env = qh_security::merge_env(base_env, &options.env);

    let mut cmd = Command::new(&program);
    cmd.args(args)
        .env_clear()
        .envs(env)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &working_dir {
        cmd.current_dir(dir);
    }

    // Isolate the child in its own process group so a timeout can kill
    // the whole tree. SAFETY: setsid() is async-signal-safe and runs
    // before exec.
    #[cfg(unix)]
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return ExecResult::failure(classify_spawn_error(command, &e)),
    };

    let (stdout_sink, stderr_sink) = match sinks {
        Some((out, err)) => (Some(out), Some(err)),
        None => (None, None),
    };
    let stdout_task = child
        .stdout
        .take()
        .map(|stream| tokio::spawn(read_stream(stream, stdout_sink)));
    let stderr_task = child
        .stderr
        .take()
        .map(|stream| tokio::spawn(read_stream(stream, stderr_sink)));

    let timeout = options.effective_timeout();
    let (exit_code, timed_out, error) = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let code = status.code().unwrap_or_else(|| {
                warn!(command, "child terminated by signal; reporting exit code 1");
                1
            });
            (code, false, None)
        }
        Ok(Err(e)) => (
            -1,
            false,
            Some(QualhookError::Execution(format!(
                "waiting for '{command}' failed: {e}"
            ))),
        ),
        Err(_) => {
            warn!(command, timeout_ms = timeout.as_millis() as u64, "deadline fired, killing child");
            kill_child_process_group(&mut child);
            // Reap so the kill does not leave a zombie.
            let _ = child.wait().await;
            (
                -1,
                true,
                Some(QualhookError::Timeout {
                    command: command.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            )
        }
    };

    // The pipes hit EOF once the child is gone, so these joins complete
    // even on the timeout path, preserving any partial capture.
    let stdout = join_capture(stdout_task).await;
    let stderr = join_capture(stderr_task).await;

    debug!(command, exit_code, timed_out, "command finished");
    ExecResult {
        stdout,
        stderr,
        exit_code,
        timed_out,
        error,
    }
}

fn resolve_working_dir(options: &ExecOptions) -> Result<Option<PathBuf>, QualhookError> {
    let Some(dir) = &options.working_dir else {
        return Ok(None);
    };
    qh_security::validate_path(&dir.to_string_lossy())?;
    let absolute = if dir.is_absolute() {
        dir.clone()
    } else {
        std::env::current_dir()
            .map_err(|e| QualhookError::WorkingDirectory(format!("cannot resolve CWD: {e}")))?
            .join(dir)
    };
    if !absolute.is_dir() {
        return Err(QualhookError::WorkingDirectory(format!(
            "{} does not exist or is not a directory",
            absolute.display()
        )));
    }
    Ok(Some(absolute))
}

async fn read_stream(
    mut stream: impl AsyncReadExt + Unpin,
    sink: Option<crate::streaming::SharedSink>,
) -> String {
    let mut captured = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                captured.extend_from_slice(&buf[..n]);
                if let Some(sink) = &sink {
                    crate::streaming::write_chunk(sink, &buf[..n]);
                }
            }
        }
    }
    String::from_utf8_lossy(&captured).into_owned()
}

async fn join_capture(task: Option<tokio::task::JoinHandle<String>>) -> String {
    match task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

fn kill_child_process_group(child: &mut tokio::process::Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: kill() is async-signal-safe; the negative PID
            // targets the process group created by setsid.
            unsafe {
                libc::kill(-(pid as i32), libc::SIGKILL);
            }
            return;
        }
    }

    let _ = child.start_kill();
}

/// Map an OS spawn failure to the error taxonomy.
fn classify_spawn_error(command: &str, error: &std::io::Error) -> QualhookError {
    use std::io::ErrorKind;
    match error.kind() {
        ErrorKind::NotFound => QualhookError::CommandNotFound(command.to_string()),
        ErrorKind::PermissionDenied => QualhookError::PermissionDenied(command.to_string()),
        _ => {
            let message = error.to_string();
            if message.contains("No such file") {
                QualhookError::CommandNotFound(command.to_string())
            } else if message.contains("ermission denied") {
                QualhookError::PermissionDenied(command.to_string())
            } else if message.is_empty() {
                QualhookError::Unknown(format!("spawning '{command}' failed"))
            } else {
                QualhookError::Execution(format!("spawning '{command}' failed: {message}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
