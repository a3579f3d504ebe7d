//! # Worker contract and bundled workers.
//!
//! - [`Worker`] - the three-phase lifecycle trait
//! - [`WorkerRef`] - shared handle (`Arc<dyn Worker>`)
//! - [`NullWorker`] - waits on a cancellation token until terminated
//! - [`SilentWorker`] - completes on its own
//! - [`Sentry`] - decorator exposing lifecycle progress

mod null;
mod sentry;
mod silent;
mod worker;

pub use null::NullWorker;
pub use sentry::Sentry;
pub use silent::SilentWorker;
pub use worker::{Worker, WorkerRef};
