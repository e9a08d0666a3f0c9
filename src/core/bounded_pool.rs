//! Bounded worker pool that runs a batch of fallible tasks under an error budget.
//!
//! A batch is executed by a fixed number of dedicated OS threads pulling from a
//! shared bounded queue. Every task failure bumps a lock-free counter; the
//! failure that reaches the budget fires a one-shot [`StopSignal`], after which
//! workers stop pulling and the caller stops enqueueing.
//!
//! # Example
//!
//! ```rust
//! use prometheus_taskflow::core::{run_bounded, task, PoolError};
//!
//! let tasks = (0..10)
//!     .map(|i| {
//!         task(move || {
//!             if i % 2 == 0 {
//!                 anyhow::bail!("task {i} failed");
//!             }
//!             Ok(())
//!         })
//!     })
//!     .collect();
//!
//! let result = run_bounded(tasks, 4, 3);
//! assert!(matches!(result, Err(PoolError::ErrorsLimitExceeded { .. })));
//! ```

use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{bounded, select, Receiver};
use tracing::{debug, info, warn, Span};
use uuid::Uuid;

use crate::config::BoundedPoolConfig;
use crate::core::{AppResult, PoolError, StopSignal};

/// A zero-argument unit of work that either completes or fails.
pub type Task = Box<dyn FnOnce() -> AppResult<()> + Send + 'static>;

/// Box a closure into a [`Task`].
pub fn task<F>(f: F) -> Task
where
    F: FnOnce() -> AppResult<()> + Send + 'static,
{
    Box::new(f)
}

/// Maximum number of task failures tolerated by a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBudget {
    /// Failures are counted but never abort the batch.
    Unlimited,
    /// The batch aborts once this many tasks have failed.
    Limit(NonZeroUsize),
}

impl ErrorBudget {
    /// Build a budget from a signed threshold; `<= 0` disables the limit.
    #[must_use]
    pub fn from_threshold(threshold: i64) -> Self {
        usize::try_from(threshold)
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(Self::Unlimited, Self::Limit)
    }

    /// The limit, if any.
    #[must_use]
    pub const fn limit(self) -> Option<usize> {
        match self {
            Self::Unlimited => None,
            Self::Limit(n) => Some(n.get()),
        }
    }

    /// Whether `failures` uses up the budget. Reaching the limit counts.
    #[must_use]
    pub const fn is_exhausted(self, failures: usize) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Limit(n) => failures >= n.get(),
        }
    }
}

impl From<i64> for ErrorBudget {
    fn from(threshold: i64) -> Self {
        Self::from_threshold(threshold)
    }
}

/// Outcome counters of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Worker threads used.
    pub worker_count: usize,
    /// Tasks pushed onto the job queue.
    pub submitted: usize,
    /// Tasks that began executing.
    pub started: usize,
    /// Tasks that returned `Ok`.
    pub succeeded: usize,
    /// Tasks that returned `Err` or panicked.
    pub failed: usize,
    /// Tasks never executed because the batch stopped early.
    pub skipped: usize,
}

/// Per-batch counters shared by the workers (lock-free atomics).
#[derive(Debug, Default)]
pub(crate) struct BatchCounters {
    pub submitted: AtomicUsize,
    pub started: AtomicUsize,
    pub succeeded: AtomicUsize,
    pub failed: AtomicUsize,
}

impl BatchCounters {
    /// Snapshot the counters for a batch of `total` tasks.
    pub fn snapshot(&self, worker_count: usize, total: usize) -> BatchStats {
        let started = self.started.load(Ordering::Acquire);
        BatchStats {
            worker_count,
            submitted: self.submitted.load(Ordering::Acquire),
            started,
            succeeded: self.succeeded.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
            skipped: total.saturating_sub(started),
        }
    }
}

/// Runs batches of tasks across a fixed number of worker threads.
///
/// The pool itself holds only configuration; every call to [`BoundedPool::run`]
/// creates its own queue, counters and stop signal, so batches never share
/// state.
#[derive(Debug, Clone)]
pub struct BoundedPool {
    config: BoundedPoolConfig,
    budget: ErrorBudget,
}

impl BoundedPool {
    /// Create a pool from configuration.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidWorkerCount` if `worker_count` is zero
    /// - `PoolError::InvalidConfig` for any other invalid field
    pub fn new(config: BoundedPoolConfig) -> Result<Self, PoolError> {
        if config.worker_count == 0 {
            return Err(PoolError::InvalidWorkerCount(config.worker_count));
        }
        config.validate().map_err(PoolError::InvalidConfig)?;
        let budget = config.error_budget();
        Ok(Self { config, budget })
    }

    /// Pool configuration.
    #[must_use]
    pub const fn config(&self) -> &BoundedPoolConfig {
        &self.config
    }

    /// Error budget applied to each batch.
    #[must_use]
    pub const fn budget(&self) -> ErrorBudget {
        self.budget
    }

    /// Run a batch to completion or until the error budget is exhausted.
    ///
    /// An empty batch succeeds immediately without starting any thread.
    ///
    /// # Errors
    ///
    /// - `PoolError::ErrorsLimitExceeded` if failures reached the budget
    /// - `PoolError::Internal` if a worker thread could not be spawned
    pub fn run(&self, tasks: Vec<Task>) -> Result<BatchStats, PoolError> {
        let total = tasks.len();
        let worker_count = self.config.worker_count;
        if total == 0 {
            return Ok(BatchStats {
                worker_count,
                ..BatchStats::default()
            });
        }

        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("batch", %batch_id, workers = worker_count, tasks = total);
        let _entered = span.enter();

        let capacity = self
            .config
            .queue_capacity
            .unwrap_or_else(|| total.min(worker_count));
        let (job_tx, job_rx) = bounded::<Task>(capacity);
        let stop = StopSignal::new();
        let counters = BatchCounters::default();
        let budget = self.budget;

        let spawn_result = {
            let stop = &stop;
            let counters = &counters;
            thread::scope(move |scope| {
                let mut spawn_error = None;
                for worker_id in 0..worker_count {
                    let jobs = job_rx.clone();
                    let span = Span::current();
                    let spawned = thread::Builder::new()
                        .name(format!("tf-worker-{worker_id}"))
                        .stack_size(self.config.thread_stack_size)
                        .spawn_scoped(scope, move || {
                            let _entered = span.enter();
                            worker_loop(worker_id, &jobs, stop, counters, budget);
                        });
                    if let Err(e) = spawned {
                        warn!(worker_id, error = %e, "failed to spawn worker thread");
                        stop.fire();
                        spawn_error = Some(e);
                        break;
                    }
                }
                // Only workers hold the queue now; if they all exit, sends fail
                // instead of blocking.
                drop(job_rx);

                if spawn_error.is_none() {
                    let stop_rx = stop.listener();
                    for task in tasks {
                        select! {
                            recv(stop_rx) -> _ => {
                                debug!("stop signal observed, no longer enqueueing");
                                break;
                            }
                            send(job_tx, task) -> res => {
                                if res.is_err() {
                                    debug!("all workers gone, no longer enqueueing");
                                    break;
                                }
                                counters.submitted.fetch_add(1, Ordering::AcqRel);
                            }
                        }
                    }
                }

                // Close the queue exactly once; workers drain what is left and exit.
                drop(job_tx);
                spawn_error
            })
        };

        // Every worker has been joined; release anything still listening.
        stop.fire();

        if let Some(e) = spawn_result {
            return Err(PoolError::Internal(format!("failed to spawn worker: {e}")));
        }

        let stats = counters.snapshot(worker_count, total);
        if budget.is_exhausted(stats.failed) {
            let limit = budget.limit().unwrap_or_default();
            warn!(failures = stats.failed, limit, skipped = stats.skipped, "batch aborted: errors limit exceeded");
            return Err(PoolError::ErrorsLimitExceeded {
                failures: stats.failed,
                limit,
            });
        }

        info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            "batch completed"
        );
        Ok(stats)
    }
}

/// Run `tasks` on `workers` threads, aborting once `failure_threshold`
/// tasks have failed (`<= 0` disables the limit).
///
/// An empty task list succeeds regardless of `workers`. Negative worker
/// counts are unrepresentable, so zero is the only invalid value.
///
/// # Errors
///
/// - `PoolError::InvalidWorkerCount` if `workers` is zero and there is work
/// - `PoolError::ErrorsLimitExceeded` if failures reached the threshold
/// - `PoolError::Internal` if a worker thread could not be spawned
pub fn run_bounded(tasks: Vec<Task>, workers: usize, failure_threshold: i64) -> Result<(), PoolError> {
    if tasks.is_empty() {
        return Ok(());
    }
    let config = BoundedPoolConfig::new()
        .with_worker_count(workers)
        .with_failure_threshold(failure_threshold);
    BoundedPool::new(config)?.run(tasks).map(|_| ())
}

fn worker_loop(
    worker_id: usize,
    jobs: &Receiver<Task>,
    stop: &StopSignal,
    counters: &BatchCounters,
    budget: ErrorBudget,
) {
    debug!(worker_id, "worker started");
    let stop_rx = stop.listener();

    loop {
        let task = select! {
            recv(stop_rx) -> _ => {
                debug!(worker_id, "stop signal observed, worker exiting");
                break;
            }
            recv(jobs) -> msg => match msg {
                Ok(task) => task,
                Err(_) => {
                    debug!(worker_id, "job queue closed, worker exiting");
                    break;
                }
            },
        };

        // Both arms may have been ready; a task pulled after the stop is dropped unrun.
        if stop.is_fired() {
            drop(task);
            debug!(worker_id, "dropping task received after stop");
            break;
        }

        counters.started.fetch_add(1, Ordering::AcqRel);
        match execute(task) {
            Ok(()) => {
                counters.succeeded.fetch_add(1, Ordering::AcqRel);
            }
            Err(err) => {
                let failures = counters.failed.fetch_add(1, Ordering::AcqRel) + 1;
                debug!(worker_id, failures, error = %err, "task failed");
                if budget.is_exhausted(failures) {
                    if stop.fire() {
                        warn!(worker_id, failures, "error budget exhausted, stopping batch");
                    }
                    break;
                }
            }
        }
    }

    debug!(worker_id, "worker exiting");
}

/// Run a task, turning a panic into a failure.
fn execute(task: Task) -> AppResult<()> {
    catch_unwind(AssertUnwindSafe(task))
        .unwrap_or_else(|_| Err(anyhow::anyhow!("task panicked")))
}
