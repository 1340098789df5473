//! Round-robin pool of parallel executors for multi-tenant callers.

use std::sync::{Arc, Mutex};

use crate::parallel::{DEFAULT_WORKERS, ParallelExecutor};

/// Hands out parallel executors round-robin. Acquisition is O(1) under
/// a mutex.
#[derive(Debug)]
pub struct ExecutorPool {
    executors: Vec<Arc<ParallelExecutor>>,
    next: Mutex<usize>,
}

impl ExecutorPool {
    /// A pool of `size` executors, each with `workers` workers. Both
    /// are clamped to at least 1.
    pub fn new(size: usize, workers: usize) -> Self {
        let size = size.max(1);
        Self {
            executors: (0..size)
                .map(|_| Arc::new(ParallelExecutor::new(workers)))
                .collect(),
            next: Mutex::new(0),
        }
    }

    pub fn acquire(&self) -> Arc<ParallelExecutor> {
        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let executor = self.executors[*next].clone();
        *next = (*next + 1) % self.executors.len();
        executor
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl Default for ExecutorPool {
    fn default() -> Self {
        Self::new(1, DEFAULT_WORKERS)
    }
}
