//! Runtime adapters used to spawn pipeline relays and stage tasks.

pub mod tokio_spawner;

use std::future::Future;

pub use tokio_spawner::TokioSpawner;

/// Abstraction for spawning detached work on an async runtime.
pub trait Spawn {
    /// Spawn a future that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
