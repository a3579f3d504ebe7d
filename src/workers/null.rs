//! # NullWorker: a worker that waits to be told to stop.
//!
//! `run` parks on a [`CancellationToken`]; `terminate` cancels it and waits for
//! every task spawned on the worker's [`TaskTracker`]. It is the default base
//! worker and a handy placeholder in tests.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{error::WorkerError, logger::Logger, workers::Worker};

/// Minimal worker controlled by a cancellation token.
#[derive(Debug, Default)]
pub struct NullWorker {
    token: CancellationToken,
    tracker: TaskTracker,
    logger: OnceLock<Logger>,
}

impl NullWorker {
    /// Creates a new worker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the worker as a shared handle.
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Token cancelled by [`Worker::terminate`].
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns `true` once termination was requested.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Tracker for helper tasks; `terminate` waits for all of them.
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Logger received in `init`, if it ran.
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.get()
    }
}

#[async_trait]
impl Worker for NullWorker {
    async fn init(&self, logger: Logger) -> Result<(), WorkerError> {
        let _ = self.logger.set(logger);
        Ok(())
    }

    async fn run(&self) -> Result<(), WorkerError> {
        self.token.cancelled().await;
        Ok(())
    }

    async fn terminate(&self) -> Result<(), WorkerError> {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn test_run_returns_after_terminate() {
        let worker = NullWorker::arc();
        worker.init(Logger::detached()).await.unwrap();

        let run = tokio::spawn({
            let worker = worker.clone();
            async move { worker.run().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!run.is_finished());
        assert!(!worker.is_stopped());

        worker.terminate().await.unwrap();
        run.await.unwrap().unwrap();
        assert!(worker.is_stopped());
        assert!(worker.logger().is_some());
    }

    #[tokio::test]
    async fn test_terminate_waits_for_tracked_tasks() {
        let worker = NullWorker::new();
        let finished = Arc::new(AtomicBool::new(false));

        let token = worker.token().clone();
        let flag = finished.clone();
        worker.tracker().spawn(async move {
            token.cancelled().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        });

        worker.terminate().await.unwrap();
        assert!(finished.load(Ordering::SeqCst));
    }
}
