//! Global cap on in-flight requests across every fetch stage

use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// Shared request limiter.
///
/// Cloning is cheap and every clone draws from the same pool of permits.
#[derive(Debug, Clone)]
pub struct RequestLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl RequestLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot; the slot is released when the permit drops
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.permits.acquire().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for RequestLimiter {
    fn default() -> Self {
        Self::new(30)
    }
}
