//! Quiescence-window debouncer.
//!
//! [`Debouncer`] keeps only the most recent value pushed into it and
//! releases that value once the window has elapsed with no further push.
//! It is polled from the engine's `select!` loop: dropping the
//! [`Debouncer::settled`] future never loses the pending value, and dropping
//! the debouncer itself cancels the pending emission.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Rate limiter that collapses a burst of values into the last one.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    /// Creates an idle debouncer with the given quiescence window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Returns the quiescence window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Stores `value` as the pending emission and restarts the window.
    pub fn push(&mut self, value: T) {
        self.pending = Some(Pending {
            value,
            deadline: Instant::now() + self.window,
        });
    }

    /// Returns `true` while a value is waiting for its window to elapse.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending emission, returning its value if there was one.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Resolves with the pending value once its window has elapsed.
    ///
    /// Never resolves while idle, so callers should guard the branch with
    /// [`Self::is_pending`].
    pub async fn settled(&mut self) -> T {
        loop {
            let Some(deadline) = self.pending.as_ref().map(|p| p.deadline) else {
                return std::future::pending().await;
            };
            sleep_until(deadline).await;
            if let Some(pending) = self.pending.take() {
                return pending.value;
            }
        }
    }
}
