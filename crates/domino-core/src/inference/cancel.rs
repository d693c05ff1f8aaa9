use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared flag that aborts an estimation pass at the next branch boundary.
///
/// A flag may also carry a step limit: once more than `limit` branches have
/// been checked against it, it cancels itself.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    steps: Arc<AtomicU64>,
    limit: Option<u64>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Counts one enumeration step and reports whether the pass must stop.
    pub fn checkpoint(&self) -> bool {
        let step = self.steps.fetch_add(1, Ordering::Relaxed) + 1;
        if self.limit.is_some_and(|limit| step > limit) {
            self.cancel();
        }
        self.is_cancelled()
    }

    /// Steps counted so far by [`checkpoint`](Self::checkpoint).
    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
        self.steps.store(0, Ordering::Relaxed);
    }
}
