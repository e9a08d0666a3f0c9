//! # Prometheus Taskflow
//!
//! Concurrent execution with guaranteed, leak-free shutdown.
//!
//! This library provides two independent building blocks for running units of
//! work concurrently and tearing them down cleanly on error or cancellation.
//!
//! ## Key Features
//!
//! - **Bounded Worker Pool**: runs a batch of fallible tasks on a fixed number of
//!   OS threads and aborts early once an error budget is used up
//! - **Single-Fire Stop Signal**: a `parking_lot::Once` guarded broadcast that
//!   wakes every waiting worker, however many trigger it at once
//! - **Cancellable Pipeline**: chains stream-to-stream stages with relay tasks
//!   that stop on a `CancellationToken` and release blocked producers
//! - **Configuration**: JSON and environment (`.env`) loading with validation
//!
//! ## BoundedPool - Batches Under an Error Budget
//!
//! ```rust
//! use prometheus_taskflow::config::BoundedPoolConfig;
//! use prometheus_taskflow::core::{task, BoundedPool};
//!
//! let pool = BoundedPool::new(
//!     BoundedPoolConfig::new()
//!         .with_worker_count(4)
//!         .with_failure_threshold(2),
//! )?;
//!
//! let tasks = (0..8).map(|_| task(|| Ok(()))).collect();
//! let stats = pool.run(tasks)?;
//! assert_eq!(stats.succeeded, 8);
//! # Ok::<(), prometheus_taskflow::core::PoolError>(())
//! ```
//!
//! ## Pipeline - Cancellable Stages
//!
//! ```rust,ignore
//! use prometheus_taskflow::core::{execute_pipeline, map_stage};
//! use prometheus_taskflow::runtime::TokioSpawner;
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let double = map_stage(|v: i32| v * 2, &TokioSpawner::current());
//! let out = execute_pipeline(source, &cancel, vec![double]);
//! // ... cancel.cancel() tears every relay down.
//! ```
//!
//! For complete examples, see:
//! - `tests/bounded_pool_test.rs` - worker pool integration tests
//! - `tests/pipeline_test.rs` - pipeline cancellation and leak tests

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Configuration models for pools and pipelines.
pub mod config;
/// Core execution primitives.
pub mod core;
/// Builders to construct executors from configuration.
pub mod builders;
/// Runtime adapters for spawning async work.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;
