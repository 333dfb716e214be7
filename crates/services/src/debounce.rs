use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Schedule-or-replace timer for a single pending value.
///
/// Each `schedule` supersedes the previous pending value and restarts the
/// delay, so only the latest value is ever released.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Drop the pending value, if any, and return it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Release the pending value if its delay has elapsed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.due_at() {
            Some(due) if due <= now => self.cancel(),
            _ => None,
        }
    }

    /// Wait out the pending delay and release the value.
    pub async fn settle(&mut self) -> Option<T> {
        let due = self.due_at()?;
        sleep_until(due).await;
        self.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn later_schedule_supersedes_earlier() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("c", start);
        debouncer.schedule("co", start + Duration::from_millis(100));
        debouncer.schedule("con", start + Duration::from_millis(200));

        assert_eq!(debouncer.take_due(start + Duration::from_millis(350)), None);
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(500)),
            Some("con")
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn cancel_discards_pending_value() {
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(1, Instant::now());
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.take_due(Instant::now() + DELAY), None);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_waits_for_the_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("x", start);

        assert_eq!(debouncer.settle().await, Some("x"));
        assert!(Instant::now() >= start + DELAY);
        assert_eq!(debouncer.settle().await, None);
    }
}
