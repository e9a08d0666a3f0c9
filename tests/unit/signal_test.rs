//! Tests for the stop signal used by worker threads

use crossbeam_channel::{select, unbounded};
use prometheus_taskflow::core::StopSignal;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A worker blocked on an empty queue wakes when the signal fires.
#[test]
fn test_select_wakes_on_fire() {
    let signal = Arc::new(StopSignal::new());
    let (_job_tx, job_rx) = unbounded::<u32>();

    let worker = {
        let signal = Arc::clone(&signal);
        thread::spawn(move || {
            select! {
                recv(signal.listener()) -> _ => "stopped",
                recv(job_rx) -> _ => "job",
            }
        })
    };

    thread::sleep(Duration::from_millis(20));
    assert!(signal.fire());
    assert_eq!(worker.join().unwrap(), "stopped");
}

#[test]
fn test_debug_shows_state() {
    let signal = StopSignal::default();
    assert_eq!(format!("{signal:?}"), "StopSignal { fired: false }");
    signal.fire();
    assert_eq!(format!("{signal:?}"), "StopSignal { fired: true }");
}
