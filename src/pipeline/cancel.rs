use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative cancellation shared by the producer, workers and scoring code
///
/// A token may carry a deadline; once it passes, `is_cancelled` latches to
/// `true` for every clone.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

#[derive(Debug)]
struct TokenState {
    cancelled: AtomicBool,
    deadline: Option<(Instant, Duration)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                deadline: None,
            }),
        }
    }

    /// Token that cancels itself `budget` after creation
    pub fn with_deadline(budget: Duration) -> Self {
        Self {
            inner: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                deadline: Some((Instant::now() + budget, budget)),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return true;
        }
        if self.deadline_passed() {
            self.cancel();
            return true;
        }
        false
    }

    /// Whether the token's deadline (if any) has passed
    pub fn deadline_passed(&self) -> bool {
        self.inner
            .deadline
            .is_some_and(|(at, _)| Instant::now() >= at)
    }

    pub fn budget(&self) -> Option<Duration> {
        self.inner.deadline.map(|(_, budget)| budget)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
