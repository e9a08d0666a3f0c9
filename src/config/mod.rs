//! Configuration models for pools and pipelines.

pub mod pool;

pub use pool::{BoundedPoolConfig, PipelineConfig, TaskflowConfig};
