//! Tests for configuration validation

use prometheus_taskflow::config::{BoundedPoolConfig, PipelineConfig, TaskflowConfig};
use prometheus_taskflow::core::{ConfigError, ErrorBudget};

#[test]
fn test_pool_config_validation() {
    let valid = BoundedPoolConfig::new()
        .with_worker_count(4)
        .with_failure_threshold(3);
    assert!(valid.validate().is_ok());
    assert_eq!(valid.error_budget().limit(), Some(3));
}

#[test]
fn test_pool_config_invalid_worker_count() {
    let invalid = BoundedPoolConfig::new().with_worker_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_invalid_queue_capacity() {
    let invalid = BoundedPoolConfig::new().with_queue_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_invalid_stack_size() {
    let invalid = BoundedPoolConfig::new().with_thread_stack_size(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_negative_threshold_disables_budget() {
    let cfg = BoundedPoolConfig::new().with_failure_threshold(-2);
    assert_eq!(cfg.error_budget(), ErrorBudget::Unlimited);
}

#[test]
fn test_pipeline_config_invalid_capacity() {
    assert!(PipelineConfig { relay_capacity: 0 }.validate().is_err());
    assert!(PipelineConfig::default().validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "pool": {
            "worker_count": 6,
            "failure_threshold": 2,
            "queue_capacity": 32
        },
        "pipeline": {
            "relay_capacity": 2
        }
    }"#;

    let config = TaskflowConfig::from_json_str(json).unwrap();
    assert_eq!(config.pool.worker_count, 6);
    assert_eq!(config.pool.failure_threshold, 2);
    assert_eq!(config.pool.queue_capacity, Some(32));
    assert_eq!(config.pipeline.relay_capacity, 2);
}

#[test]
fn test_config_from_json_partial_uses_defaults() {
    let config = TaskflowConfig::from_json_str(r#"{ "pool": { "worker_count": 2 } }"#).unwrap();
    assert_eq!(config.pool.worker_count, 2);
    assert_eq!(config.pool.failure_threshold, 0);
    assert_eq!(config.pipeline, PipelineConfig::default());
}

#[test]
fn test_config_from_json_rejects_invalid() {
    let err = TaskflowConfig::from_json_str(r#"{ "pool": { "worker_count": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = TaskflowConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
