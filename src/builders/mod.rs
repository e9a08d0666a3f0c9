//! Builders to construct executors from configuration.

pub mod pool_builder;

#[cfg(feature = "tokio-runtime")]
pub use pool_builder::build_pipeline;
pub use pool_builder::build_pool;
