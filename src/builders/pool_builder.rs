//! Builders to construct pools and pipelines from configuration.

use crate::config::TaskflowConfig;
use crate::core::{BoundedPool, PoolError};
#[cfg(feature = "tokio-runtime")]
use crate::core::Pipeline;

/// Build a bounded pool from the root configuration.
///
/// # Errors
///
/// Returns the same errors as [`BoundedPool::new`].
pub fn build_pool(cfg: &TaskflowConfig) -> Result<BoundedPool, PoolError> {
    BoundedPool::new(cfg.pool.clone())
}

/// Build an empty pipeline carrying the configured relay settings.
#[cfg(feature = "tokio-runtime")]
#[must_use]
pub fn build_pipeline<T>(cfg: &TaskflowConfig) -> Pipeline<T>
where
    T: Send + 'static,
{
    Pipeline::new().with_config(&cfg.pipeline)
}
