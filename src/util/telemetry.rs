//! Tracing setup for pool workers and pipeline relays.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "prometheus_taskflow=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`]. Worker thread names (`tf-worker-N`) are printed so batch
/// logs can be told apart. Does nothing if a global subscriber already exists.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    init_tracing_with(filter);
}

/// Same as [`init_tracing`] with an explicit filter.
pub fn init_tracing_with(filter: EnvFilter) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
