use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag for aborting a long-running route search from another thread.
///
/// Clones share the same flag. The search polls it once per expanded node
/// and fails with [`ErrorKind::Cancelled`](crate::errors::ErrorKind::Cancelled)
/// once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Cannot be undone.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
