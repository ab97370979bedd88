//! Debug-build deadlock watcher for `parking_lot` locks

use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) const CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Poll for deadlocks every `interval` on a background thread
pub(crate) fn spawn_watcher(interval: Duration) -> JoinHandle<()> {
    thread::Builder::new()
        .name("deadlock-watcher".into())
        .spawn(move || loop {
            thread::sleep(interval);
            report(check());
        })
        .unwrap_or_else(|e| {
            tracing::warn!("Deadlock watcher not started: {}", e);
            thread::spawn(|| {})
        })
}

/// Number of deadlocked cycles found right now
fn check() -> usize {
    let deadlocks = parking_lot::deadlock::check_deadlock();
    for (i, threads) in deadlocks.iter().enumerate() {
        tracing::error!(cycle = i, threads = threads.len(), "Deadlock detected");
        for t in threads {
            tracing::error!("Thread {:?}\n{:?}", t.thread_id(), t.backtrace());
        }
    }
    deadlocks.len()
}

fn report(cycles: usize) {
    if cycles > 0 {
        tracing::error!(cycles, "Application is deadlocked; state locks will not recover");
    }
}
