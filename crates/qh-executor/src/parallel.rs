//! Bounded-concurrency fan-out over the single-command executor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::executor::{ExecOptions, ExecResult, execute};

/// Default worker count; clamped to at least 1.
pub const DEFAULT_WORKERS: usize = 4;

/// One command in a parallel batch.
#[derive(Debug, Clone)]
pub struct ParallelCommand {
    pub id: String,
    pub command: String,
    pub args: Vec<String>,
    pub options: ExecOptions,
}

/// Result of one batch entry. `order` is the input position, for stable
/// rendering regardless of completion order.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub id: String,
    pub order: usize,
    pub result: ExecResult,
}

impl CommandOutcome {
    pub fn failed(&self) -> bool {
        self.result.error.is_some() || self.result.timed_out || self.result.exit_code != 0
    }
}

/// Outcomes of a batch, sorted by input order.
#[derive(Debug, Clone, Default)]
pub struct ParallelResult {
    pub outcomes: Vec<CommandOutcome>,
}

impl ParallelResult {
    /// True iff any command errored, timed out, or exited non-zero.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(CommandOutcome::failed)
    }
}

/// Batch result plus per-command output blocks for display.
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    pub result: ParallelResult,
    pub stdout_blocks: Vec<String>,
    pub stderr_blocks: Vec<String>,
    pub failed_ids: Vec<String>,
}

impl AggregatedResult {
    pub fn has_failures(&self) -> bool {
        self.result.has_failures()
    }
}

/// Invoked after each command completes with `(completed, total, id)`.
/// Calls are serialized by an internal mutex.
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Cooperative cancellation shared between the caller and a batch.
/// Checked before each dispatch; commands already in flight run out
/// their own timeout cycle.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// Runs batches of commands with bounded concurrency.
#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    workers: usize,
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl ParallelExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute a batch. Completion order is non-deterministic; the
    /// returned outcomes are sorted back into input order.
    pub async fn execute(
        &self,
        commands: Vec<ParallelCommand>,
        cancel: &CancelToken,
        progress: Option<ProgressCallback>,
    ) -> ParallelResult {
        let total = commands.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        // Completed counter doubles as the progress serialization lock.
        let completed = Arc::new(std::sync::Mutex::new(0usize));

        let mut tasks = JoinSet::new();
        for (order, entry) in commands.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let progress = progress.clone();
            let completed = completed.clone();

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) if !cancel.is_canceled() => {
                        execute(&entry.command, &entry.args, &entry.options).await
                    }
                    _ => ExecResult::canceled(),
                };

                if let Some(callback) = &progress {
                    let mut done = completed.lock().unwrap_or_else(|e| e.into_inner());
                    *done += 1;
                    callback(*done, total, &entry.id);
                }

                CommandOutcome {
                    id: entry.id,
                    order,
                    result,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!("parallel worker task failed: {e}"),
            }
        }
        outcomes.sort_by_key(|outcome| outcome.order);

        ParallelResult { outcomes }
    }

    /// Execute a batch and aggregate per-command output into labelled
    /// blocks plus the list of failed IDs.
    pub async fn execute_with_aggregation(
        &self,
        commands: Vec<ParallelCommand>,
        cancel: &CancelToken,
        progress: Option<ProgressCallback>,
    ) -> AggregatedResult {
        let result = self.execute(commands, cancel, progress).await;

        let stdout_blocks = result
            .outcomes
            .iter()
            .map(|o| format!("=== {} ===\n{}", o.id, o.result.stdout))
            .collect();
        let stderr_blocks = result
            .outcomes
            .iter()
            .map(|o| format!("=== {} ===\n{}", o.id, o.result.stderr))
            .collect();
        let failed_ids = result
            .outcomes
            .iter()
            .filter(|o| o.failed())
            .map(|o| o.id.clone())
            .collect();

        AggregatedResult {
            result,
            stdout_blocks,
            stderr_blocks,
            failed_ids,
        }
    }
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
