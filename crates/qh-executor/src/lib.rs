//! Subprocess execution: single commands with timeout and capture, and
//! semaphore-bounded parallel fan-out with aggregation.

pub mod executor;
pub mod parallel;
pub mod pool;
pub mod streaming;

pub use executor::{ExecOptions, ExecResult, execute};
pub use parallel::{
    AggregatedResult, CancelToken, CommandOutcome, DEFAULT_WORKERS, ParallelCommand,
    ParallelExecutor, ParallelResult, ProgressCallback,
};
pub use pool::ExecutorPool;
pub use streaming::{SharedSink, execute_streaming};
