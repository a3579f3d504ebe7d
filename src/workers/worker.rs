//! # Worker abstraction.
//!
//! This module defines the [`Worker`] trait: a unit with a three-phase lifecycle
//! (`init`, `run`, `terminate`). The common handle type is [`WorkerRef`], an
//! `Arc<dyn Worker>` suitable for sharing across the runtime.
//!
//! [`Orchestrator`](crate::Orchestrator) implements `Worker` too, so orchestrators
//! nest into supervision trees without any extra glue.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::WorkerError, logger::Logger};

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;

/// # Unit with an init / run / terminate lifecycle.
///
/// - `init` is called once, before `run`.
/// - `run` blocks until the job is done or the worker is told to stop.
/// - `terminate` asks the worker to stop and returns once it has stopped.
///
/// `run` and `terminate` are called concurrently on the same instance, which is
/// why every method takes `&self`.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use workvisor::{Logger, Worker, WorkerError};
///
/// struct Ticker {
///     stop: CancellationToken,
/// }
///
/// #[async_trait]
/// impl Worker for Ticker {
///     async fn init(&self, logger: Logger) -> Result<(), WorkerError> {
///         tracing::debug!(parent: logger.span(), "ticker ready");
///         Ok(())
///     }
///
///     async fn run(&self) -> Result<(), WorkerError> {
///         self.stop.cancelled().await;
///         Ok(())
///     }
///
///     async fn terminate(&self) -> Result<(), WorkerError> {
///         self.stop.cancel();
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Prepares the worker. `logger` is already scoped to this worker.
    async fn init(&self, logger: Logger) -> Result<(), WorkerError>;

    /// Does the worker's job until completion or until asked to stop.
    async fn run(&self) -> Result<(), WorkerError>;

    /// Requests a stop and waits until the worker has stopped.
    async fn terminate(&self) -> Result<(), WorkerError>;
}
