use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter shared by a producer and the sequences it starts.
///
/// Starting a new sequence bumps the generation, which invalidates every token
/// handed out before it.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate all outstanding tokens and issue a fresh one
    pub fn advance(&self) -> CancelToken {
        let issued = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        CancelToken {
            issued,
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate all outstanding tokens
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

/// Checked by a sequence before every step it emits
#[derive(Clone, Debug)]
pub struct CancelToken {
    issued: u64,
    current: Arc<AtomicU64>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.issued
    }
}
