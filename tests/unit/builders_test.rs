//! Tests for configuration-driven builders

use prometheus_taskflow::builders::{build_pipeline, build_pool};
use prometheus_taskflow::config::TaskflowConfig;
use prometheus_taskflow::core::{task, PoolError};

#[test]
fn test_build_pool_from_config() {
    let mut cfg = TaskflowConfig::default();
    cfg.pool.worker_count = 2;
    cfg.pool.failure_threshold = 1;

    let pool = build_pool(&cfg).unwrap();
    assert_eq!(pool.config().worker_count, 2);
    assert_eq!(pool.budget().limit(), Some(1));

    let err = pool
        .run(vec![task(|| Ok(())), task(|| anyhow::bail!("nope"))])
        .unwrap_err();
    assert!(err.is_limit_exceeded());
}

#[test]
fn test_build_pool_rejects_zero_workers() {
    let mut cfg = TaskflowConfig::default();
    cfg.pool.worker_count = 0;
    assert!(matches!(build_pool(&cfg), Err(PoolError::InvalidWorkerCount(0))));
}

#[test]
fn test_build_pipeline_starts_empty() {
    let pipeline = build_pipeline::<u32>(&TaskflowConfig::default());
    assert!(pipeline.is_empty());
}
