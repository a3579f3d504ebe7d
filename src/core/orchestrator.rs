//! # Orchestrator: a worker made of workers.
//!
//! The [`Orchestrator`] wraps a base worker plus any number of named sub-workers
//! and drives their combined lifecycle. It implements [`Worker`] itself, so
//! orchestrators nest into supervision trees.
//!
//! ## Lifecycle
//! ```text
//! add_sub_worker("a"), add_sub_worker("b")        Registering
//!          │
//! init(logger) ──► a.init(logger.named("a"))       Initializing
//!              ──► b.init(logger.named("b"))
//!              ──► base.init(logger)               (base always last)
//!          │                                        Ready
//! run() ──► spawn a.run ║ b.run ║ base.run          Running
//!           first of:
//!             ├─ worker error / panic  ─► return Err(error)
//!             ├─ terminate() requested ─► return Ok(())
//!             └─ every run finished    ─► return Ok(())
//!           finally (always, once):
//!             shutdown: base ─► b ─► a   (reverse init order, best-effort)
//!             publish aggregated result ─► terminate() callers         Stopped
//! ```
//!
//! ## Rules
//! - Sub-workers can only be registered before `init`.
//! - Only workers whose `init` succeeded receive `terminate`.
//! - A panic inside any worker is caught and surfaced as [`WorkerError::Panicked`].
//! - `terminate` is idempotent and may be called from any number of tasks.
//! - If `init` failed, the initialized workers are cleaned up by `terminate`, or
//!   by `init` itself when `terminate` was already requested while it ran.
//!   Otherwise `terminate` waits for `run` to finalize; without `run` it never returns.
//!
//! ## Example
//! ```rust
//! use std::{sync::Arc, time::Duration};
//! use workvisor::{Logger, NullWorker, Orchestrator, Worker};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut orch = Orchestrator::new(NullWorker::arc());
//!     orch.add_sub_worker("cache", NullWorker::arc())?;
//!     orch.add_sub_worker("http", NullWorker::arc())?;
//!
//!     orch.init(Logger::new(tracing::info_span!("service"))).await?;
//!
//!     let orch = Arc::new(orch);
//!     let stopper = {
//!         let orch = orch.clone();
//!         tokio::spawn(async move {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             orch.terminate().await
//!         })
//!     };
//!
//!     orch.run().await?;
//!     stopper.await??;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    core::{
        builder::OrchestratorBuilder,
        config::OrchestratorConfig,
        registry::Registry,
        runner::{contain, run_worker},
        shutdown::{Finalizer, Outcome, Shutdown},
    },
    error::{ConfigError, WorkerError},
    logger::Logger,
    workers::{Worker, WorkerRef},
};

/// Lifecycle phase of an [`Orchestrator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Accepting sub-worker registrations.
    Registering,
    /// `init` is in progress.
    Initializing,
    /// Every worker initialized; `run` may be called.
    Ready,
    /// `run` is in progress.
    Running,
    /// Shutdown completed.
    Stopped,
    /// A worker failed to initialize.
    Failed,
}

struct State {
    phase: Phase,
    initialized: Vec<String>,
    logger: Logger,
}

/// Supervises a base worker and a named, ordered set of sub-workers.
pub struct Orchestrator {
    cfg: OrchestratorConfig,
    registry: Registry,
    state: Mutex<State>,
    /// Fires on `terminate` or on a fatal worker error.
    token: CancellationToken,
    done: Arc<Outcome>,
}

impl Orchestrator {
    /// Creates an orchestrator around `base` with default configuration.
    pub fn new(base: WorkerRef) -> Self {
        Self::with_config(base, OrchestratorConfig::default())
    }

    /// Creates an orchestrator around `base`.
    pub fn with_config(base: WorkerRef, cfg: OrchestratorConfig) -> Self {
        let (done, _) = watch::channel(None);
        Self {
            cfg,
            registry: Registry::new(base),
            state: Mutex::new(State {
                phase: Phase::Registering,
                initialized: Vec::new(),
                logger: Logger::detached(),
            }),
            token: CancellationToken::new(),
            done: Arc::new(done),
        }
    }

    /// Starts a builder around `base`.
    pub fn builder(base: WorkerRef) -> OrchestratorBuilder {
        OrchestratorBuilder::new(base)
    }

    /// Registers a sub-worker. Sub-workers initialize in registration order.
    ///
    /// Fails, leaving the registry untouched, once `init` has begun or if `name`
    /// is taken or reserved.
    pub fn add_sub_worker(
        &mut self,
        name: impl Into<String>,
        worker: WorkerRef,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.state.get_mut().phase != Phase::Registering {
            return Err(ConfigError::AddedAfterInit { name });
        }
        self.registry.add(name, worker)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Names of successfully initialized workers, in initialization order.
    ///
    /// The base worker appears as `"_"`.
    pub fn initialized(&self) -> Vec<String> {
        self.state.lock().initialized.clone()
    }

    /// Registered sub-worker names, in registration order.
    pub fn sub_workers(&self) -> &[String] {
        self.registry.names()
    }

    /// Configuration in use.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.cfg
    }

    /// Returns `true` once termination was requested or a worker failed fatally.
    pub fn is_terminating(&self) -> bool {
        self.token.is_cancelled()
    }

    fn plan(&self, state: &State) -> Shutdown {
        let workers = state
            .initialized
            .iter()
            .filter_map(|name| self.registry.get(name).map(|w| (name.clone(), w.clone())))
            .collect();
        Shutdown::new(workers, state.logger.clone()).slow_after(self.cfg.slow_terminate_after())
    }

    /// Waits up to the configured grace period for worker run tasks to drain.
    async fn drain(&self, set: &mut JoinSet<Result<(), WorkerError>>, logger: &Logger) {
        let Some(grace) = self.cfg.grace() else {
            return;
        };
        let drained =
            tokio::time::timeout(grace, async { while set.join_next().await.is_some() {} }).await;
        if drained.is_err() {
            tracing::warn!(
                parent: logger.span(),
                still_running = set.len(),
                grace = ?grace,
                "Sub workers still running after grace period"
            );
        }
    }
}

/// Resolves with the first worker failure, or `Ok` once every task finished cleanly.
async fn first_failure(set: &mut JoinSet<Result<(), WorkerError>>) -> Result<(), WorkerError> {
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(join_err) => {
                return Err(WorkerError::fail(format!("worker task failed: {join_err}")));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Worker for Orchestrator {
    /// Initializes sub-workers in registration order, then the base worker.
    ///
    /// Stops at the first failure; workers initialized so far stay recorded.
    async fn init(&self, logger: Logger) -> Result<(), WorkerError> {
        {
            let mut st = self.state.lock();
            if st.phase != Phase::Registering {
                return Err(ConfigError::AlreadyInitialized.into());
            }
            st.phase = Phase::Initializing;
            st.logger = logger.clone();
        }

        for (name, worker) in self.registry.iter() {
            let scoped = if Registry::is_base(name) {
                logger.clone()
            } else {
                tracing::debug!(
                    parent: logger.span(),
                    sub_worker = name,
                    "Initializing sub worker"
                );
                logger.named(name)
            };

            if let Err(err) = contain(name, async { worker.init(scoped).await }).await {
                let label = Registry::label(name);
                tracing::error!(
                    parent: logger.span(),
                    sub_worker = label,
                    error = %err,
                    "Could not initialize sub worker"
                );
                // A terminate that arrived mid-init saw no `Failed` phase and is
                // waiting on `done`; the cleanup is ours to run.
                let orphaned = {
                    let mut st = self.state.lock();
                    if self.token.is_cancelled() {
                        st.phase = Phase::Stopped;
                        Some(self.plan(&st))
                    } else {
                        st.phase = Phase::Failed;
                        None
                    }
                };
                if let Some(plan) = orphaned {
                    Finalizer::new(plan, Arc::clone(&self.done)).finish().await;
                }
                return Err(WorkerError::Init {
                    worker: label.to_string(),
                    source: Box::new(err),
                });
            }
            self.state.lock().initialized.push(name.to_string());
        }

        self.state.lock().phase = Phase::Ready;
        Ok(())
    }

    /// Runs every worker concurrently until one fails, `terminate` is called,
    /// or all of them finish. Shutdown always runs before this returns.
    async fn run(&self) -> Result<(), WorkerError> {
        let (plan, logger) = {
            let mut st = self.state.lock();
            match st.phase {
                Phase::Ready => st.phase = Phase::Running,
                Phase::Running | Phase::Stopped => return Err(ConfigError::AlreadyRunning.into()),
                _ => return Err(ConfigError::NotInitialized.into()),
            }
            (self.plan(&st), st.logger.clone())
        };
        let finalizer = Finalizer::new(plan, Arc::clone(&self.done));

        tracing::debug!(
            parent: logger.span(),
            workers = self.registry.len(),
            "Starting sub workers"
        );
        let mut set = JoinSet::new();
        for (name, worker) in self.registry.iter() {
            let scoped = if Registry::is_base(name) {
                logger.clone()
            } else {
                logger.named(name)
            };
            let span = scoped.span().clone();
            set.spawn(run_worker(name.to_string(), worker.clone(), scoped).instrument(span));
        }

        let outcome = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::warn!(parent: logger.span(), "Worker termination requested");
                Ok(())
            }
            res = first_failure(&mut set) => match res {
                Ok(()) => {
                    tracing::info!(parent: logger.span(), "All sub workers have finished");
                    Ok(())
                }
                Err(err) => {
                    tracing::error!(parent: logger.span(), error = %err, "Worker Init/Run failure");
                    self.token.cancel();
                    Err(err)
                }
            },
        };

        finalizer.finish().await;
        self.drain(&mut set, &logger).await;
        set.detach_all();
        self.state.lock().phase = Phase::Stopped;

        outcome
    }

    /// Requests shutdown and waits for its aggregated result.
    async fn terminate(&self) -> Result<(), WorkerError> {
        self.token.cancel();

        let orphaned = {
            let mut st = self.state.lock();
            if st.phase == Phase::Failed {
                st.phase = Phase::Stopped;
                Some(self.plan(&st))
            } else {
                None
            }
        };
        if let Some(plan) = orphaned {
            Finalizer::new(plan, Arc::clone(&self.done)).finish().await;
        }

        let mut rx = self.done.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().unwrap_or(Ok(())),
            Err(_) => Ok(()),
        }
    }
}
