//! Deadline-based debouncing.
//!
//! The grid owns no timers. A [`Debouncer`] remembers the latest value and
//! when it becomes due; the host polls it from its own loop.

use std::time::{Duration, Instant};

/// Keeps the most recent value until `delay` passed without a newer one.
#[derive(Debug, Clone)]
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

    /// Replaces the pending value and restarts the delay.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value once it is due.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_before_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(400));
        debouncer.schedule(1, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(399)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(400)), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_reschedule_keeps_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(400));
        debouncer.schedule(1, start);
        debouncer.schedule(2, start + Duration::from_millis(300));
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(700)), Some(2));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule("x", start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
