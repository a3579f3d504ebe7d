//! # workvisor
//!
//! **Workvisor** composes independently running workers into a single unit that
//! obeys the same lifecycle contract as its parts.
//!
//! Every worker has three phases: `init`, `run`, `terminate`. An [`Orchestrator`]
//! wraps a base worker and any number of named sub-workers, initializes them in
//! order, runs them concurrently, contains their panics, and shuts them down in
//! reverse order with aggregated errors. Because the orchestrator is itself a
//! [`Worker`], orchestrators nest into supervision trees.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  sub-worker  │   │  sub-worker  │   │ base worker  │
//!     │     "a"      │   │     "b"      │   │    ("_")     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - Registry (name → worker, registration order, base last)        │
//! │  - initialized names (who may receive terminate)                  │
//! │  - CancellationToken (terminate requested / fatal error)          │
//! │  - watch channel (published shutdown result)                      │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  run task    │   │  run task    │   │  run task    │
//!     │ catch_unwind │   │ catch_unwind │   │ catch_unwind │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────► JoinSet (first failure wins) ◄─────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! init:      a ─► b ─► _                  (sequential, registration order)
//! run:       a ║ b ║ _                    (concurrent)
//!              └─ stop on: first error/panic │ terminate() │ all finished
//! shutdown:  _ ─► b ─► a                  (sequential, reverse init order)
//!              └─ every terminate attempted; failures aggregated
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types                                |
//! |-------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Contract**      | Three-phase async worker lifecycle.                           | [`Worker`], [`WorkerRef`]                |
//! | **Orchestration** | Ordered init, concurrent run, reverse-order shutdown.         | [`Orchestrator`], [`Phase`]              |
//! | **Workers**       | Ready-made placeholders and a lifecycle-recording decorator.  | [`NullWorker`], [`SilentWorker`], [`Sentry`] |
//! | **Errors**        | Typed, name-carrying, aggregatable errors.                    | [`WorkerError`], [`ConfigError`]         |
//! | **Logging**       | Per-worker scoped `tracing` spans.                            | [`Logger`]                               |
//! | **Configuration** | Shutdown grace/wait settings.                                 | [`OrchestratorConfig`]                   |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use workvisor::{Logger, NullWorker, Orchestrator, Sentry, Worker};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ingest = Sentry::wrap(None);
//!     let orch = Orchestrator::builder(NullWorker::arc())
//!         .with_sub_worker("ingest", ingest.clone())
//!         .with_sub_worker("http", NullWorker::arc())
//!         .build()?;
//!
//!     orch.init(Logger::new(tracing::info_span!("service"))).await?;
//!     let orch = Arc::new(orch);
//!
//!     let running = {
//!         let orch = orch.clone();
//!         tokio::spawn(async move { orch.run().await })
//!     };
//!     ingest.wait_for_run_called().await;
//!
//!     orch.terminate().await?;
//!     running.await??;
//!     assert!(ingest.terminate_is_completed());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod logger;
mod workers;

// ---- Public re-exports ----

pub use self::core::{BASE_WORKER, Orchestrator, OrchestratorBuilder, OrchestratorConfig, Phase};
pub use error::{ConfigError, WorkerError};
pub use logger::Logger;
pub use workers::{NullWorker, Sentry, SilentWorker, Worker, WorkerRef};
