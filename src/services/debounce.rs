use std::time::Duration;
use tokio::time::{sleep_until, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds back a value until no newer one has been pushed for `delay`.
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the pending value and restarts the timer.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value without waiting.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Resolves with the pending value once its quiet period has elapsed.
    /// Never resolves while nothing is pending. Safe to drop mid-wait: the
    /// value stays pending.
    pub async fn ready(&mut self) -> T {
        let deadline = match &self.pending {
            Some((_, deadline)) => *deadline,
            None => return std::future::pending().await,
        };
        sleep_until(deadline).await;

        match self.flush() {
            Some(value) => value,
            None => std::future::pending().await,
        }
    }
}
