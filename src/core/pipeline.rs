//! Cancellable multi-stage pipeline over channel streams.
//!
//! A [`Pipeline`] chains [`Stage`]s, each a function from an input stream to an
//! output stream. In front of every stage the pipeline inserts a relay task
//! that forwards values one at a time and watches the caller's
//! [`CancellationToken`]. Stages never see the raw source or the token; only
//! relays observe cancellation.
//!
//! # Shutdown
//!
//! When the token fires, or a relay's downstream receiver is dropped, the
//! relay:
//!
//! 1. drops its output, so the stage behind it observes end-of-stream and the
//!    shutdown cascades to the final consumer;
//! 2. closes its input with [`Receiver::close`] and drains whatever is still
//!    buffered.
//!
//! Closing the input makes every pending and future `send` on the upstream
//! channel fail. That is how an upstream producer blocked on a send gets
//! released, even for an endless source: producers are not required to watch
//! the token themselves, they only have to stop once `send` returns an error.
//!
//! # Example
//!
//! ```rust
//! use prometheus_taskflow::core::{execute_pipeline, map_stage, source_from_iter};
//! use prometheus_taskflow::runtime::TokioSpawner;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cancel = CancellationToken::new();
//! let spawner = TokioSpawner::current();
//! let source = source_from_iter(vec![1, 2, 3], 1, &spawner);
//! let mut out = execute_pipeline(
//!     source,
//!     &cancel,
//!     vec![map_stage(|v: i32| v * 2, &spawner), map_stage(|v: i32| v * 2, &spawner)],
//! );
//!
//! let mut values = Vec::new();
//! while let Some(v) = out.recv().await {
//!     values.push(v);
//! }
//! assert_eq!(values, vec![4, 8, 12]);
//! # }
//! ```

use std::fmt;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::PipelineConfig;
use crate::runtime::{Spawn, TokioSpawner};

/// A stream of values flowing between stages.
pub type Stream<T> = Receiver<T>;

/// A stream-to-stream transformer, invoked once when the pipeline is set up.
pub type Stage<T> = Box<dyn FnOnce(Stream<T>) -> Stream<T> + Send>;

/// Box a closure into a [`Stage`].
pub fn stage<T, F>(f: F) -> Stage<T>
where
    F: FnOnce(Stream<T>) -> Stream<T> + Send + 'static,
{
    Box::new(f)
}

/// Ordered sequence of stages, consumed by [`Pipeline::execute`].
pub struct Pipeline<T> {
    stages: Vec<Stage<T>>,
    relay_capacity: usize,
}

impl<T> Pipeline<T>
where
    T: Send + 'static,
{
    /// Empty pipeline with single-slot relays.
    #[must_use]
    pub fn new() -> Self {
        Self::from_stages(Vec::new())
    }

    /// Pipeline over an existing stage list.
    #[must_use]
    pub fn from_stages(stages: Vec<Stage<T>>) -> Self {
        Self {
            stages,
            relay_capacity: PipelineConfig::default().relay_capacity,
        }
    }

    /// Apply relay settings from configuration.
    #[must_use]
    pub fn with_config(self, config: &PipelineConfig) -> Self {
        self.with_relay_capacity(config.relay_capacity)
    }

    /// Append a stage.
    #[must_use]
    pub fn stage<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Stream<T>) -> Stream<T> + Send + 'static,
    {
        self.stages.push(Box::new(f));
        self
    }

    /// Capacity of each relay's output channel; zero is treated as one.
    #[must_use]
    pub fn with_relay_capacity(mut self, capacity: usize) -> Self {
        self.relay_capacity = capacity.max(1);
        self
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wire the stages behind `source` and return the final stream.
    ///
    /// With no stages the source is returned unchanged. Otherwise one relay
    /// per stage is spawned on `spawner` and every stage is called exactly once.
    pub fn execute<S>(self, source: Stream<T>, cancel: &CancellationToken, spawner: &S) -> Stream<T>
    where
        S: Spawn,
    {
        if self.stages.is_empty() {
            return source;
        }

        let mut stream = source;
        for (index, stage) in self.stages.into_iter().enumerate() {
            let (tx, rx) = mpsc::channel(self.relay_capacity);
            spawner.spawn(relay(index, stream, tx, cancel.clone()));
            stream = stage(rx);
        }
        stream
    }
}

impl<T> Default for Pipeline<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .field("relay_capacity", &self.relay_capacity)
            .finish()
    }
}

/// Apply `stages` to `source` in order, stopping every relay once `cancel` fires.
///
/// Relays are spawned on the current tokio runtime.
///
/// # Panics
///
/// Panics when called outside a tokio runtime with a non-empty stage list.
pub fn execute_pipeline<T>(source: Stream<T>, cancel: &CancellationToken, stages: Vec<Stage<T>>) -> Stream<T>
where
    T: Send + 'static,
{
    if stages.is_empty() {
        return source;
    }
    Pipeline::from_stages(stages).execute(source, cancel, &TokioSpawner::current())
}

/// Forward `input` to `output` until the input ends, the token fires or the
/// downstream receiver goes away.
async fn relay<T>(index: usize, mut input: Receiver<T>, output: Sender<T>, cancel: CancellationToken)
where
    T: Send,
{
    trace!(stage = index, "relay started");
    loop {
        let item = tokio::select! {
            () = cancel.cancelled() => {
                debug!(stage = index, "relay cancelled while receiving");
                break;
            }
            item = input.recv() => item,
        };

        let Some(value) = item else {
            trace!(stage = index, "relay input closed");
            return;
        };

        tokio::select! {
            () = cancel.cancelled() => {
                debug!(stage = index, "relay cancelled while sending");
                break;
            }
            sent = output.send(value) => {
                if sent.is_err() {
                    debug!(stage = index, "relay downstream closed");
                    break;
                }
            }
        }
    }

    drop(output);
    let drained = drain(input).await;
    debug!(stage = index, drained, "relay stopped");
}

/// Close `input` and discard whatever it still buffers.
///
/// After `close` no new value can be sent, so this terminates even when the
/// producer would otherwise never stop.
async fn drain<T>(mut input: Receiver<T>) -> usize {
    input.close();
    let mut drained = 0;
    while input.recv().await.is_some() {
        drained += 1;
    }
    drained
}
