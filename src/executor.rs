//! Task processor implementations.
//!
//! The lifecycle schedules decode work through the
//! [`TaskProcessor`](crate::externals::TaskProcessor) abstraction so it
//! stays decoupled from any particular runtime. This module provides the
//! Tokio-backed production implementation and an inline one for tests and
//! single-threaded hosts.

use crate::externals::TaskProcessor;
use tokio::runtime::Handle;

/// Schedules tasks on a Tokio runtime's blocking thread pool.
///
/// Decode tasks are CPU-bound, so they go through `spawn_blocking` rather
/// than onto the async worker threads.
#[derive(Debug, Clone)]
pub struct TokioTaskProcessor {
    handle: Handle,
}

impl TokioTaskProcessor {
    /// Captures the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; use
    /// [`with_handle`](TokioTaskProcessor::with_handle) in that case.
    pub fn new() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Uses an explicit runtime handle.
    ///
    /// Network callbacks arrive on I/O threads that are not runtime
    /// workers; holding the handle lets tasks be scheduled from there.
    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl TaskProcessor for TokioTaskProcessor {
    fn start_task(&self, task: Box<dyn FnOnce() + Send>) {
        self.handle.spawn_blocking(task);
    }
}

/// Runs each task immediately on the calling thread.
///
/// Collapses the worker context into the caller's, which makes lifecycle
/// sequences deterministic. Intended for tests and headless tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTaskProcessor;

impl InlineTaskProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl TaskProcessor for InlineTaskProcessor {
    fn start_task(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_inline_runs_immediately() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        InlineTaskProcessor::new().start_task(Box::new(move || {
            flag.store(true, Ordering::SeqCst);
        }));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_tokio_processor_runs_task() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let processor = TokioTaskProcessor::new();
        processor.start_task(Box::new(move || {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_tokio_processor_from_foreign_thread() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let processor = TokioTaskProcessor::with_handle(Handle::current());

        // Simulate a network callback arriving on a non-runtime thread.
        std::thread::spawn(move || {
            processor.start_task(Box::new(move || {
                let _ = tx.send("done");
            }));
        });

        assert_eq!(rx.await.unwrap(), "done");
    }
}
