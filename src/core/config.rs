//! # Orchestrator configuration.
//!
//! Provides [`OrchestratorConfig`], the settings an [`Orchestrator`](crate::Orchestrator)
//! consults around shutdown.
//!
//! ## Sentinel values
//! - `termination_grace = 0s` → `run` does not wait for worker run tasks after shutdown
//! - `termination_wait = 0s` → no slow-terminate warnings
//!
//! Neither setting ever forces a worker to stop: shutdown always waits for every
//! `terminate` call to return.

use std::time::Duration;

/// Shutdown-related settings for an orchestrator.
///
/// ## Field semantics
/// - `termination_grace`: how long `run` waits, after shutdown, for worker run tasks to drain
/// - `termination_wait`: `terminate` calls slower than this are logged as slow
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum time `run` waits for worker run tasks once shutdown has completed.
    ///
    /// Tasks still running afterwards are detached (never aborted) and counted in a warning.
    pub termination_grace: Duration,

    /// Threshold above which a single worker's `terminate` is reported as slow.
    pub termination_wait: Duration,
}

impl OrchestratorConfig {
    /// Returns the drain grace period as an `Option`.
    ///
    /// - `None` → do not wait
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn grace(&self) -> Option<Duration> {
        if self.termination_grace == Duration::ZERO {
            None
        } else {
            Some(self.termination_grace)
        }
    }

    /// Returns the slow-terminate threshold as an `Option`.
    #[inline]
    pub fn slow_terminate_after(&self) -> Option<Duration> {
        if self.termination_wait == Duration::ZERO {
            None
        } else {
            Some(self.termination_wait)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.grace(), None);
        assert_eq!(cfg.slow_terminate_after(), None);
    }

    #[test]
    fn test_non_zero_enables() {
        let cfg = OrchestratorConfig {
            termination_grace: Duration::from_secs(2),
            termination_wait: Duration::from_millis(500),
        };
        assert_eq!(cfg.grace(), Some(Duration::from_secs(2)));
        assert_eq!(cfg.slow_terminate_after(), Some(Duration::from_millis(500)));
    }
}
