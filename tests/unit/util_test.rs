//! Tests for telemetry helpers

use prometheus_taskflow::core::{run_bounded, task};
use prometheus_taskflow::util::{init_tracing, init_tracing_with, DEFAULT_FILTER};
use tracing_subscriber::EnvFilter;

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    init_tracing_with(EnvFilter::new("debug"));
    tracing::info!("tracing initialized repeatedly without panicking");
}

#[test]
fn test_default_filter_parses() {
    assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
}

#[test]
fn test_batch_logs_under_subscriber() {
    init_tracing();
    let tasks = (0..4).map(|_| task(|| Ok(()))).collect();
    assert!(run_bounded(tasks, 2, 1).is_ok());
}
