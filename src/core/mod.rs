//! Core execution primitives: the bounded worker pool and the cancellable pipeline.

pub mod bounded_pool;
pub mod error;
#[cfg(feature = "tokio-runtime")]
pub mod pipeline;
pub mod signal;
#[cfg(feature = "tokio-runtime")]
pub mod stages;

pub use bounded_pool::{run_bounded, task, BatchStats, BoundedPool, ErrorBudget, Task};
pub use error::{AppResult, ConfigError, PoolError};
#[cfg(feature = "tokio-runtime")]
pub use pipeline::{execute_pipeline, stage, Pipeline, Stage, Stream};
pub use signal::StopSignal;
#[cfg(feature = "tokio-runtime")]
pub use stages::{filter_stage, inspect_stage, map_stage, source_from_iter};
