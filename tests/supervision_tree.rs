use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;
use workvisor::{
    Logger, NullWorker, Orchestrator, Phase, Sentry, SilentWorker, Worker, WorkerError,
};

fn logger() -> Logger {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
    Logger::new(tracing::info_span!("root"))
}

/// Fails its run after a short delay.
struct Crashing;

#[async_trait]
impl Worker for Crashing {
    async fn init(&self, _logger: Logger) -> Result<(), WorkerError> {
        Ok(())
    }

    async fn run(&self) -> Result<(), WorkerError> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err(WorkerError::fail("upstream closed"))
    }

    async fn terminate(&self) -> Result<(), WorkerError> {
        Ok(())
    }
}

#[tokio::test]
async fn stub_workers_stop_on_terminate() -> anyhow::Result<()> {
    let (w1, w2, w3) = (NullWorker::arc(), NullWorker::arc(), NullWorker::arc());
    let mut orch = Orchestrator::new(NullWorker::arc());
    orch.add_sub_worker("w1", w1.clone())?;
    orch.add_sub_worker("w2", w2.clone())?;
    orch.add_sub_worker("w3", w3.clone())?;
    orch.init(logger()).await?;
    let orch = Arc::new(orch);

    let wait = Duration::from_millis(50);
    let started = Instant::now();
    let stopper = {
        let orch = orch.clone();
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            orch.terminate().await
        })
    };

    orch.run().await?;
    assert!(started.elapsed() >= wait, "run returned before terminate");
    stopper.await??;

    assert!(w1.is_stopped());
    assert!(w2.is_stopped());
    assert!(w3.is_stopped());
    assert_eq!(orch.phase(), Phase::Stopped);
    Ok(())
}

#[tokio::test]
async fn nested_orchestrators_shut_down_together() -> anyhow::Result<()> {
    let leaf = Sentry::wrap(None);
    let inner = Orchestrator::builder(NullWorker::arc())
        .with_sub_worker("leaf", leaf.clone())
        .build()?;
    let inner = Sentry::wrap(Some(Arc::new(inner)));

    let sibling = Sentry::wrap(None);
    let outer = Orchestrator::builder(NullWorker::arc())
        .with_sub_worker("inner", inner.clone())
        .with_sub_worker("sibling", sibling.clone())
        .build()?;
    outer.init(logger()).await?;
    assert!(leaf.init_done());

    let outer = Arc::new(outer);
    let running = {
        let outer = outer.clone();
        tokio::spawn(async move { outer.run().await })
    };
    timeout(Duration::from_secs(1), leaf.wait_for_run_called()).await?;

    outer.terminate().await?;
    running.await??;

    assert!(leaf.terminate_is_completed());
    assert!(inner.terminate_is_completed());
    assert!(sibling.terminate_is_completed());
    // "sibling" registered after "inner", so it is torn down first.
    assert!(sibling.terminate_called_at() <= inner.terminate_called_at());
    Ok(())
}

#[tokio::test]
async fn nested_failure_propagates_to_the_top() -> anyhow::Result<()> {
    let mut inner = Orchestrator::new(NullWorker::arc());
    inner.add_sub_worker("crashing", Arc::new(Crashing))?;

    let sibling = Sentry::wrap(None);
    let mut outer = Orchestrator::new(SilentWorker::arc());
    outer.add_sub_worker("inner", Arc::new(inner))?;
    outer.add_sub_worker("sibling", sibling.clone())?;
    outer.init(logger()).await?;

    let err = timeout(Duration::from_secs(1), outer.run())
        .await?
        .expect_err("inner failure must surface");

    let WorkerError::Exited { worker, source } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(worker, "inner");
    assert!(matches!(source.as_ref(), WorkerError::Exited { worker, .. } if worker == "crashing"));
    assert!(sibling.terminate_is_completed());
    Ok(())
}
