//! Tests for error types

use prometheus_taskflow::core::{ConfigError, PoolError};

#[test]
fn test_invalid_worker_count_error() {
    let err = PoolError::InvalidWorkerCount(0);
    assert_eq!(format!("{}", err), "invalid workers count: 0");
}

#[test]
fn test_errors_limit_exceeded_error() {
    let err = PoolError::ErrorsLimitExceeded { failures: 4, limit: 3 };
    assert_eq!(format!("{}", err), "errors limit exceeded: 4 failures, limit 3");
    assert!(err.is_limit_exceeded());
}

#[test]
fn test_invalid_config_error() {
    let err = PoolError::InvalidConfig("queue_capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: queue_capacity must be greater than 0"
    );
    assert!(!err.is_limit_exceeded());
}

#[test]
fn test_config_env_error() {
    let err = ConfigError::Env {
        key: "TASKFLOW_WORKERS".to_string(),
        value: "lots".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "environment variable `TASKFLOW_WORKERS` has invalid value `lots`"
    );
}
