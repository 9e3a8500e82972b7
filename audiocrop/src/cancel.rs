/*!
    Cooperative cancellation.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/**
    Shared flag checked once per pump or crop iteration.

    Clones observe the same flag.
*/
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
