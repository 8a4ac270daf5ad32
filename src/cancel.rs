//! Cooperative cancellation for long-running animations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop request. Algorithms poll it between major steps; nothing is
/// interrupted preemptively and an in-flight pacing sleep runs to the end.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears a previous request so the next run starts fresh.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
