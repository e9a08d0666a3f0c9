//! Ready-made stages and sources.
//!
//! Each stage spawns one task through the given [`Spawn`] when the pipeline is
//! wired, so stages can be built and wired from threads outside the runtime.
//! The task ends when its input closes or when its own consumer drops the
//! output stream.

use tokio::sync::mpsc;

use crate::core::pipeline::{Stage, Stream};
use crate::runtime::Spawn;

/// Stage applying `f` to every value.
pub fn map_stage<T, F, S>(mut f: F, spawner: &S) -> Stage<T>
where
    T: Send + 'static,
    F: FnMut(T) -> T + Send + 'static,
    S: Spawn + Clone + Send + 'static,
{
    let spawner = spawner.clone();
    Box::new(move |input| spawn_step(input, &spawner, move |v| Some(f(v))))
}

/// Stage keeping only values for which `pred` returns `true`.
pub fn filter_stage<T, F, S>(mut pred: F, spawner: &S) -> Stage<T>
where
    T: Send + 'static,
    F: FnMut(&T) -> bool + Send + 'static,
    S: Spawn + Clone + Send + 'static,
{
    let spawner = spawner.clone();
    Box::new(move |input| spawn_step(input, &spawner, move |v| pred(&v).then_some(v)))
}

/// Stage calling `f` on every value and passing it through unchanged.
pub fn inspect_stage<T, F, S>(mut f: F, spawner: &S) -> Stage<T>
where
    T: Send + 'static,
    F: FnMut(&T) + Send + 'static,
    S: Spawn + Clone + Send + 'static,
{
    let spawner = spawner.clone();
    Box::new(move |input| {
        spawn_step(input, &spawner, move |v| {
            f(&v);
            Some(v)
        })
    })
}

fn spawn_step<T, F, S>(mut input: Stream<T>, spawner: &S, mut step: F) -> Stream<T>
where
    T: Send + 'static,
    F: FnMut(T) -> Option<T> + Send + 'static,
    S: Spawn,
{
    let (tx, rx) = mpsc::channel(1);
    spawner.spawn(async move {
        while let Some(value) = input.recv().await {
            let Some(out) = step(value) else {
                continue;
            };
            if tx.send(out).await.is_err() {
                break;
            }
        }
    });
    rx
}

/// Feed `iter` into a new stream of the given capacity.
///
/// The producer stops at the end of the iterator or as soon as the receiving
/// side is closed or dropped, so an endless iterator is fine.
pub fn source_from_iter<T, I, S>(iter: I, capacity: usize, spawner: &S) -> Stream<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    S: Spawn,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let iter = iter.into_iter();
    spawner.spawn(async move {
        for item in iter {
            if tx.send(item).await.is_err() {
                break;
            }
        }
    });
    rx
}
