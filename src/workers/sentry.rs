//! # Sentry: lifecycle introspection for any worker.
//!
//! [`Sentry`] wraps a worker and passes every call straight through while recording
//! when each lifecycle phase was entered and completed. It is mostly useful in tests
//! that need to know whether workers have been initialized, started or terminated.
//!
//! ```text
//! init()      ──► inner.init()      ──► init mark (+ result)
//! run()       ──► run_called mark ──► inner.run()       ──► run mark (+ result)
//! terminate() ──► term_called mark ──► inner.terminate() ──► term mark (+ result)
//! ```
//!
//! Probes never block; `wait_for_*` methods block until the mark is set and can be
//! bounded with `tokio::time::timeout`.

use std::{
    sync::{Arc, OnceLock},
    time::Instant,
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    error::WorkerError,
    logger::Logger,
    workers::{NullWorker, Worker, WorkerRef},
};

/// One-shot latch with a timestamp and an optional result.
#[derive(Debug, Default)]
struct Mark {
    fired: CancellationToken,
    at: OnceLock<Instant>,
    result: OnceLock<Result<(), WorkerError>>,
}

impl Mark {
    fn set(&self) {
        let _ = self.at.set(Instant::now());
        self.fired.cancel();
    }

    fn complete(&self, result: &Result<(), WorkerError>) {
        let _ = self.result.set(result.clone());
        self.set();
    }

    fn is_set(&self) -> bool {
        self.fired.is_cancelled()
    }

    fn at(&self) -> Option<Instant> {
        self.at.get().copied()
    }

    async fn wait(&self) -> Result<(), WorkerError> {
        self.fired.cancelled().await;
        self.result.get().cloned().unwrap_or(Ok(()))
    }
}

/// Transparent worker decorator that records lifecycle progress.
pub struct Sentry {
    inner: WorkerRef,
    init: Mark,
    run_called: Mark,
    run: Mark,
    terminate_called: Mark,
    terminate: Mark,
}

impl Sentry {
    /// Wraps `inner`.
    pub fn new(inner: WorkerRef) -> Self {
        Self {
            inner,
            init: Mark::default(),
            run_called: Mark::default(),
            run: Mark::default(),
            terminate_called: Mark::default(),
            terminate: Mark::default(),
        }
    }

    /// Wraps `inner`, or a fresh [`NullWorker`] when `None`.
    pub fn wrap(inner: Option<WorkerRef>) -> Arc<Self> {
        Arc::new(Self::new(inner.unwrap_or_else(|| NullWorker::arc() as WorkerRef)))
    }

    /// Returns `true` once `init` has returned.
    pub fn init_done(&self) -> bool {
        self.init.is_set()
    }

    /// Returns `true` once `run` has been entered (it may still be running).
    pub fn run_is_called(&self) -> bool {
        self.run_called.is_set()
    }

    /// Returns `true` once `run` has returned.
    pub fn run_is_completed(&self) -> bool {
        self.run.is_set()
    }

    /// Returns `true` once `terminate` has been entered (it may still be running).
    pub fn terminate_is_called(&self) -> bool {
        self.terminate_called.is_set()
    }

    /// Returns `true` once `terminate` has returned.
    pub fn terminate_is_completed(&self) -> bool {
        self.terminate.is_set()
    }

    /// When `terminate` was entered.
    pub fn terminate_called_at(&self) -> Option<Instant> {
        self.terminate_called.at()
    }

    /// When `init` returned.
    pub fn init_done_at(&self) -> Option<Instant> {
        self.init.at()
    }

    /// Waits for `init` to return and yields its result.
    pub async fn wait_for_init_done(&self) -> Result<(), WorkerError> {
        self.init.wait().await
    }

    /// Waits until `run` has been entered.
    pub async fn wait_for_run_called(&self) {
        let _ = self.run_called.wait().await;
    }

    /// Waits for `run` to return and yields its result.
    pub async fn wait_for_run_completed(&self) -> Result<(), WorkerError> {
        self.run.wait().await
    }

    /// Waits until `terminate` has been entered.
    pub async fn wait_for_terminate_called(&self) {
        let _ = self.terminate_called.wait().await;
    }

    /// Waits for `terminate` to return and yields its result.
    pub async fn wait_for_terminate_completed(&self) -> Result<(), WorkerError> {
        self.terminate.wait().await
    }
}

impl Default for Sentry {
    fn default() -> Self {
        Self::new(NullWorker::arc())
    }
}

#[async_trait]
impl Worker for Sentry {
    async fn init(&self, logger: Logger) -> Result<(), WorkerError> {
        let res = self.inner.init(logger).await;
        self.init.complete(&res);
        res
    }

    async fn run(&self) -> Result<(), WorkerError> {
        self.run_called.set();
        let res = self.inner.run().await;
        self.run.complete(&res);
        res
    }

    async fn terminate(&self) -> Result<(), WorkerError> {
        self.terminate_called.set();
        let res = self.inner.terminate().await;
        self.terminate.complete(&res);
        res
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    struct Failing;

    #[async_trait]
    impl Worker for Failing {
        async fn init(&self, _logger: Logger) -> Result<(), WorkerError> {
            Err(WorkerError::fail("no config"))
        }
        async fn run(&self) -> Result<(), WorkerError> {
            Ok(())
        }
        async fn terminate(&self) -> Result<(), WorkerError> {
            Err(WorkerError::fail("still busy"))
        }
    }

    #[tokio::test]
    async fn test_tracks_lifecycle() {
        let sentry = Sentry::wrap(None);
        assert!(!sentry.init_done());

        sentry.init(Logger::detached()).await.unwrap();
        assert!(sentry.init_done());
        assert!(sentry.init_done_at().is_some());

        let run = tokio::spawn({
            let sentry = sentry.clone();
            async move { sentry.run().await }
        });
        timeout(Duration::from_secs(1), sentry.wait_for_run_called())
            .await
            .expect("run was not called");
        assert!(!sentry.run_is_completed());
        assert!(!sentry.terminate_is_called());

        sentry.terminate().await.unwrap();
        run.await.unwrap().unwrap();

        assert!(sentry.terminate_is_called());
        assert!(sentry.terminate_is_completed());
        assert!(sentry.run_is_completed());
        assert!(sentry.terminate_called_at().is_some());
        sentry.wait_for_run_completed().await.unwrap();
    }

    #[tokio::test]
    async fn test_passes_errors_through() {
        let sentry = Sentry::wrap(Some(Arc::new(Failing)));

        let err = sentry.init(Logger::detached()).await.unwrap_err();
        assert_eq!(err.to_string(), "execution failed: no config");
        assert!(sentry.wait_for_init_done().await.is_err());

        assert!(sentry.terminate().await.is_err());
        let recorded = sentry.wait_for_terminate_completed().await.unwrap_err();
        assert_eq!(recorded.to_string(), "execution failed: still busy");
    }

    #[tokio::test]
    async fn test_wait_times_out_when_never_called() {
        let sentry = Sentry::default();
        let waited = timeout(
            Duration::from_millis(20),
            sentry.wait_for_terminate_called(),
        )
        .await;
        assert!(waited.is_err());
    }
}
