use crate::{
    core::{Orchestrator, OrchestratorConfig},
    error::ConfigError,
    workers::WorkerRef,
};

/// Builder for constructing an [`Orchestrator`] in one expression.
///
/// Registration errors are collected and reported by [`build`](Self::build),
/// so the chain never has to be broken up with `?`.
pub struct OrchestratorBuilder {
    base: WorkerRef,
    cfg: OrchestratorConfig,
    sub_workers: Vec<(String, WorkerRef)>,
}

impl OrchestratorBuilder {
    /// Creates a new builder around the base worker.
    pub fn new(base: WorkerRef) -> Self {
        Self {
            base,
            cfg: OrchestratorConfig::default(),
            sub_workers: Vec::new(),
        }
    }

    /// Sets the orchestrator configuration.
    pub fn with_config(mut self, cfg: OrchestratorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Queues a sub-worker; registration order is preserved.
    pub fn with_sub_worker(mut self, name: impl Into<String>, worker: WorkerRef) -> Self {
        self.sub_workers.push((name.into(), worker));
        self
    }

    /// Builds the orchestrator, failing on the first invalid registration.
    pub fn build(self) -> Result<Orchestrator, ConfigError> {
        let mut orch = Orchestrator::with_config(self.base, self.cfg);
        for (name, worker) in self.sub_workers {
            orch.add_sub_worker(name, worker)?;
        }
        Ok(orch)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::workers::NullWorker;

    #[test]
    fn test_build_keeps_order_and_config() {
        let cfg = OrchestratorConfig {
            termination_wait: Duration::from_secs(1),
            ..OrchestratorConfig::default()
        };
        let orch = Orchestrator::builder(NullWorker::arc())
            .with_config(cfg.clone())
            .with_sub_worker("b", NullWorker::arc())
            .with_sub_worker("a", NullWorker::arc())
            .build()
            .unwrap();

        assert_eq!(orch.sub_workers(), ["b".to_string(), "a".to_string()]);
        assert_eq!(orch.config(), &cfg);
    }

    #[test]
    fn test_build_reports_duplicate() {
        let res = Orchestrator::builder(NullWorker::arc())
            .with_sub_worker("a", NullWorker::arc())
            .with_sub_worker("a", NullWorker::arc())
            .build();

        assert!(matches!(res, Err(ConfigError::Duplicate { name }) if name == "a"));
    }
}
