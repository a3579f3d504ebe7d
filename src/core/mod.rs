//! Orchestration core: registration, ordered init, concurrent run, coordinated shutdown.
//!
//! The public API from this module is [`Orchestrator`] (with its [`Phase`],
//! [`OrchestratorBuilder`] and [`OrchestratorConfig`]).
//!
//! Internal modules:
//! - [`registry`]: named workers and their registration order;
//! - [`runner`]: runs one worker call with panic containment;
//! - [`shutdown`]: reverse-order termination and result publishing;
//! - [`orchestrator`]: ties the phases together.

mod builder;
mod config;
mod orchestrator;
mod registry;
mod runner;
mod shutdown;

pub use builder::OrchestratorBuilder;
pub use config::OrchestratorConfig;
pub use orchestrator::{Orchestrator, Phase};
pub use registry::BASE_WORKER;
