//! CarExtractor logging and crash reporting
//!
//! Diagnostics for the command line tool. Console logs go to stderr so that
//! stdout carries only command output (tables, JSON). A JSON copy of every
//! event lands in a daily file under [`log_dir`].

#[cfg(debug_assertions)]
mod deadlock;
mod logging;
mod panic_hook;

pub use logging::{cleanup_logs_in, cleanup_old_logs, init_logging, LogGuard};
pub use panic_hook::init_panic_hook;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "CarExtractor", "CarExtractor")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("car_extractor").join("logs"))
}

/// Initialize logging, the panic hook and (debug builds) the deadlock watcher.
///
/// The returned guard flushes the file writer when dropped, so `main` must hold it.
pub fn init() -> anyhow::Result<LogGuard> {
    let guard = init_logging()?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    deadlock::spawn_watcher(deadlock::CHECK_INTERVAL);

    Ok(guard)
}
