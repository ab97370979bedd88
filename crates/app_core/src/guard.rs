//! Single-flight guard for long-running jobs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Allows at most one holder at a time. A second `try_acquire` while a
/// token is alive fails instead of queuing.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    active: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flight. The flag is released when the token is dropped.
    pub fn try_acquire(&self) -> Option<FlightToken> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightToken {
                active: Arc::clone(&self.active),
            })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Proof of holding a [`SingleFlight`]
#[derive(Debug)]
#[must_use = "the flight is released as soon as the token is dropped"]
pub struct FlightToken {
    active: Arc<AtomicBool>,
}

impl Drop for FlightToken {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
