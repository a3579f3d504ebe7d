//! # SilentWorker: a worker that finishes on its own.
//!
//! `run` marks the worker done and returns immediately; `terminate` only waits
//! for that mark. Nothing is logged and nothing can fail, which makes it the
//! right filler when an orchestrator should be able to complete by itself.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{error::WorkerError, logger::Logger, workers::Worker};

/// Worker whose `run` completes immediately.
#[derive(Debug, Default)]
pub struct SilentWorker {
    done: CancellationToken,
}

impl SilentWorker {
    /// Creates a new worker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the worker as a shared handle.
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns `true` once `run` has completed.
    pub fn is_done(&self) -> bool {
        self.done.is_cancelled()
    }
}

#[async_trait]
impl Worker for SilentWorker {
    async fn init(&self, _logger: Logger) -> Result<(), WorkerError> {
        Ok(())
    }

    async fn run(&self) -> Result<(), WorkerError> {
        self.done.cancel();
        Ok(())
    }

    /// Blocks until `run` has completed.
    async fn terminate(&self) -> Result<(), WorkerError> {
        self.done.cancelled().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_immediately() {
        let worker = SilentWorker::new();
        worker.init(Logger::detached()).await.unwrap();
        assert!(!worker.is_done());

        worker.run().await.unwrap();
        assert!(worker.is_done());
        worker.terminate().await.unwrap();
    }
}
