//! Streaming variant of the executor: tees child output to
//! caller-provided sinks while still capturing it.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::executor::{ExecOptions, ExecResult};

/// A writer shared with concurrent OS readers. The mutex keeps chunk
/// writes from interleaving partially.
pub type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// Execute a command, teeing stdout and stderr to the given sinks as
/// chunks arrive. The returned result still carries the full capture.
pub async fn execute_streaming(
    command: &str,
    args: &[String],
    options: &ExecOptions,
    stdout_sink: SharedSink,
    stderr_sink: SharedSink,
) -> ExecResult {
    crate::executor::run(command, args, options, Some((stdout_sink, stderr_sink))).await
}

pub(crate) fn write_chunk(sink: &SharedSink, chunk: &[u8]) {
    // Sink failures never fail the run; the capture is authoritative.
    if let Ok(mut guard) = sink.lock() {
        let _ = guard.write_all(chunk);
        let _ = guard.flush();
    }
}
