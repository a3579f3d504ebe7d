//! # Coordinated shutdown.
//!
//! [`Shutdown`] terminates initialized workers one at a time in the reverse of
//! their initialization order and publishes the combined result to every caller
//! waiting in [`Orchestrator::terminate`](crate::Orchestrator).
//!
//! ```text
//! initialized: [a, b, c, _]
//! shutdown:     _ ─► c ─► b ─► a          (sequential, best-effort)
//!                │    │    │    │
//!                └────┴────┴────┴─► errors ─► WorkerError::join ─► done.send(Some(result))
//! ```
//!
//! ## Rules
//! - Only workers whose `init` succeeded are terminated.
//! - A failing (or panicking) `terminate` never skips the remaining workers.
//! - The result is published exactly once per plan.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::watch;

use crate::{
    core::{registry::Registry, runner::contain},
    error::WorkerError,
    logger::Logger,
    workers::WorkerRef,
};

/// Shared slot the shutdown result is published into.
pub type Outcome = watch::Sender<Option<Result<(), WorkerError>>>;

/// Ordered termination plan.
pub struct Shutdown {
    /// Workers to terminate, already in shutdown order.
    steps: Vec<(String, WorkerRef)>,
    logger: Logger,
    slow_after: Option<Duration>,
}

impl Shutdown {
    /// Builds a plan from workers listed in **initialization** order.
    pub fn new(initialized: Vec<(String, WorkerRef)>, logger: Logger) -> Self {
        let mut steps = initialized;
        steps.reverse();
        Self {
            steps,
            logger,
            slow_after: None,
        }
    }

    /// Reports `terminate` calls slower than `threshold`.
    pub fn slow_after(mut self, threshold: Option<Duration>) -> Self {
        self.slow_after = threshold;
        self
    }

    /// Names in the order they will be terminated.
    pub fn order(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Terminates every worker, then publishes and returns the aggregated result.
    pub async fn execute(self, done: &Outcome) -> Result<(), WorkerError> {
        let log = self.logger.span();
        tracing::info!(parent: log, order = ?self.order(), "Terminating sub workers");

        let mut errors = Vec::new();
        for (name, worker) in &self.steps {
            let label = Registry::label(name);
            let started = Instant::now();
            let res = contain(name, async { worker.terminate().await }).await;
            let elapsed = started.elapsed();

            if let Some(threshold) = self.slow_after.filter(|t| elapsed > *t) {
                tracing::warn!(
                    parent: log,
                    sub_worker = label,
                    elapsed = ?elapsed,
                    threshold = ?threshold,
                    "Sub worker was slow to terminate"
                );
            }

            match res {
                Ok(()) if Registry::is_base(name) => {}
                Ok(()) => tracing::info!(parent: log, sub_worker = label, "Sub worker terminated"),
                Err(err) => {
                    if Registry::is_base(name) {
                        tracing::error!(parent: log, error = %err, "Worker terminated with error");
                    } else {
                        tracing::error!(
                            parent: log,
                            sub_worker = label,
                            error = %err,
                            "Sub worker terminated with error"
                        );
                    }
                    let err = match err {
                        panicked @ WorkerError::Panicked { .. } => panicked,
                        other => WorkerError::Terminate {
                            worker: label.to_string(),
                            source: Box::new(other),
                        },
                    };
                    errors.push(err);
                }
            }
        }

        tracing::info!(parent: log, "All sub workers terminated, Worker shutdown complete");

        let result = WorkerError::join(errors);
        done.send_replace(Some(result.clone()));
        result
    }
}

/// Runs a [`Shutdown`] exactly once, on its own task.
///
/// [`Finalizer::finish`] is the normal path. If the owner is dropped before
/// finishing (e.g. the `run` future was cancelled), `Drop` spawns the plan on the
/// current runtime so waiting `terminate` callers are still released.
pub struct Finalizer {
    plan: Option<Shutdown>,
    done: Arc<Outcome>,
}

impl Finalizer {
    /// Arms a finalizer for `plan`.
    pub fn new(plan: Shutdown, done: Arc<Outcome>) -> Self {
        Self {
            plan: Some(plan),
            done,
        }
    }

    /// Executes the plan on a dedicated task and waits for it.
    pub async fn finish(mut self) {
        let Some(plan) = self.plan.take() else {
            return;
        };
        let done = Arc::clone(&self.done);
        let task = tokio::spawn(async move { plan.execute(&done).await });
        if let Err(join_err) = task.await {
            self.done.send_replace(Some(Err(WorkerError::fail(format!(
                "shutdown task failed: {join_err}"
            )))));
        }
    }
}

impl Drop for Finalizer {
    fn drop(&mut self) {
        let Some(plan) = self.plan.take() else {
            return;
        };
        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            let done = Arc::clone(&self.done);
            rt.spawn(async move {
                let _ = plan.execute(&done).await;
            });
        }
    }
}
