//! # Contained execution of one worker lifecycle call.
//!
//! Every worker `run` (and every `terminate` during shutdown) goes through
//! [`contain`], which catches panics so a misbehaving worker cannot take down
//! the orchestrator or its siblings.
//!
//! ```text
//! run_worker(name, worker)
//!   └─► contain(worker.run())
//!         ├─ Ok(())        → Ok(())
//!         ├─ Err(e)        → WorkerError::Exited   { worker: name, source: e }
//!         └─ panic(payload)→ WorkerError::Panicked { worker: name, info }
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a worker panics while holding a lock.

use std::{any::Any, future::Future, panic::AssertUnwindSafe};

use futures::FutureExt;

use crate::{core::registry::Registry, error::WorkerError, logger::Logger, workers::WorkerRef};

/// Awaits `fut`, turning a panic into [`WorkerError::Panicked`] attributed to `name`.
pub async fn contain<F>(name: &str, fut: F) -> Result<(), WorkerError>
where
    F: Future<Output = Result<(), WorkerError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(WorkerError::Panicked {
            worker: Registry::label(name).to_string(),
            info: panic_message(payload.as_ref()),
        }),
    }
}

/// Runs one worker to completion, wrapping its error with the worker's name.
///
/// Panics and errors are logged here, where the worker's span is still at hand.
pub async fn run_worker(
    name: String,
    worker: WorkerRef,
    logger: Logger,
) -> Result<(), WorkerError> {
    let label = Registry::label(&name);
    let res = match contain(&name, async { worker.run().await }).await {
        Ok(()) => return Ok(()),
        Err(err @ WorkerError::Panicked { .. }) => err,
        Err(err) => WorkerError::Exited {
            worker: label.to_string(),
            source: Box::new(err),
        },
    };

    if let WorkerError::Panicked { info, .. } = &res {
        tracing::error!(parent: logger.span(), sub_worker = label, panic = %info, "recover panic");
    } else {
        tracing::debug!(
            parent: logger.span(),
            sub_worker = label,
            error = %res,
            "sub worker run failed"
        );
    }
    Err(res)
}

/// Renders a panic payload as text.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(err) = payload.downcast_ref::<WorkerError>() {
        err.to_string()
    } else {
        "unknown panic".to_string()
    }
}
