//! Error types used by the workvisor orchestrator and workers.
//!
//! This module defines two enums:
//!
//! - [`ConfigError`]: misuse of the orchestrator during setup (bad registration, wrong phase).
//! - [`WorkerError`]: failures produced by worker lifecycle calls, including the
//!   wrapped and aggregated forms the orchestrator returns.
//!
//! Both provide `as_label` for logs. Errors are `Clone` so a single shutdown result can
//! be handed to every caller waiting in [`Worker::terminate`](crate::Worker::terminate).

use thiserror::Error;

/// # Configuration errors.
///
/// Returned synchronously from registration and from phase checks in
/// `init` / `run`. The caller must not proceed to `run` after one of these.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A sub-worker was registered after initialization began.
    #[error("sub worker {name} added after initialization")]
    AddedAfterInit {
        /// Name of the rejected sub-worker.
        name: String,
    },

    /// A sub-worker name was registered twice.
    #[error("sub worker with name {name} added twice")]
    Duplicate {
        /// The duplicated name.
        name: String,
    },

    /// The name is reserved for the base worker.
    #[error("sub worker name {name:?} is reserved for the base worker")]
    Reserved {
        /// The reserved name that was used.
        name: String,
    },

    /// `init` was called more than once.
    #[error("orchestrator already initialized")]
    AlreadyInitialized,

    /// `run` was called before a successful `init`.
    #[error("orchestrator not initialized")]
    NotInitialized,

    /// `run` was called more than once.
    #[error("orchestrator already running")]
    AlreadyRunning,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use workvisor::ConfigError;
    ///
    /// let err = ConfigError::Duplicate { name: "db".into() };
    /// assert_eq!(err.as_label(), "config_duplicate");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::AddedAfterInit { .. } => "config_added_after_init",
            ConfigError::Duplicate { .. } => "config_duplicate",
            ConfigError::Reserved { .. } => "config_reserved",
            ConfigError::AlreadyInitialized => "config_already_initialized",
            ConfigError::NotInitialized => "config_not_initialized",
            ConfigError::AlreadyRunning => "config_already_running",
        }
    }
}

/// # Errors produced by worker lifecycle calls.
///
/// Leaf workers usually return [`WorkerError::Fail`]. The orchestrator wraps
/// what it receives with the offending worker's name (`Init`, `Exited`,
/// `Panicked`, `Terminate`) and combines shutdown failures into `Aggregate`.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum WorkerError {
    /// Orchestrator misconfiguration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic worker failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A worker failed to initialize.
    #[error("sub worker {worker} failed to initialize: {source}")]
    Init {
        /// Name of the failing worker.
        worker: String,
        /// Error returned by the worker.
        source: Box<WorkerError>,
    },

    /// A worker's `run` returned an error.
    #[error("sub worker {worker} exited: {source}")]
    Exited {
        /// Name of the failing worker.
        worker: String,
        /// Error returned by the worker.
        source: Box<WorkerError>,
    },

    /// A worker panicked; the panic was caught and converted.
    ///
    /// Only the payload message is kept. The stack trace is not captured here:
    /// it is printed by the process panic hook (see `RUST_BACKTRACE`) when the
    /// panic happens.
    #[error("sub worker {worker} panicked: {info}")]
    Panicked {
        /// Name of the panicking worker.
        worker: String,
        /// Panic payload rendered as text (`"unknown panic"` for non-string payloads).
        info: String,
    },

    /// A worker's `terminate` returned an error.
    #[error("sub worker {worker} terminated with error: {source}")]
    Terminate {
        /// Name of the failing worker.
        worker: String,
        /// Error returned by the worker.
        source: Box<WorkerError>,
    },

    /// Several failures collected during one shutdown.
    #[error("{}", join_messages(.errors))]
    Aggregate {
        /// Every collected failure, in shutdown order.
        errors: Vec<WorkerError>,
    },
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use workvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::fail("boom").as_label(), "worker_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Config(e) => e.as_label(),
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Init { .. } => "worker_init_failed",
            WorkerError::Exited { .. } => "worker_exited",
            WorkerError::Panicked { .. } => "worker_panicked",
            WorkerError::Terminate { .. } => "worker_terminate_failed",
            WorkerError::Aggregate { .. } => "worker_aggregate",
        }
    }

    /// Returns the name of the worker this error is attributed to, if any.
    pub fn worker(&self) -> Option<&str> {
        match self {
            WorkerError::Init { worker, .. }
            | WorkerError::Exited { worker, .. }
            | WorkerError::Panicked { worker, .. }
            | WorkerError::Terminate { worker, .. } => Some(worker),
            _ => None,
        }
    }

    /// Flattens an aggregate into its members; any other error yields itself.
    pub fn errors(&self) -> Vec<&WorkerError> {
        match self {
            WorkerError::Aggregate { errors } => errors.iter().collect(),
            other => vec![other],
        }
    }

    /// Combines collected errors: `Ok` when empty, `Aggregate` otherwise.
    pub fn join(errors: Vec<WorkerError>) -> Result<(), WorkerError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WorkerError::Aggregate { errors })
        }
    }
}

fn join_messages(errors: &[WorkerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exited_names_worker() {
        let err = WorkerError::Exited {
            worker: "db".into(),
            source: Box::new(WorkerError::fail("connection refused")),
        };
        assert_eq!(
            err.to_string(),
            "sub worker db exited: execution failed: connection refused"
        );
        assert_eq!(err.worker(), Some("db"));
    }

    #[test]
    fn test_join_empty_is_ok() {
        assert!(WorkerError::join(Vec::new()).is_ok());
    }

    #[test]
    fn test_join_keeps_every_message() {
        let err = WorkerError::join(vec![
            WorkerError::fail("first"),
            WorkerError::fail("second"),
        ])
        .unwrap_err();

        assert_eq!(err.errors().len(), 2);
        assert_eq!(
            err.to_string(),
            "execution failed: first\nexecution failed: second"
        );
    }

    #[test]
    fn test_config_converts_transparently() {
        let err: WorkerError = ConfigError::AlreadyRunning.into();
        assert_eq!(err.to_string(), "orchestrator already running");
        assert_eq!(err.as_label(), "config_already_running");
    }
}
