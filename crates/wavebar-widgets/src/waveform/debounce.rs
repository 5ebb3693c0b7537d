//! Trailing-edge debouncing for resize bursts
//!
//! The debouncer never reads the clock itself. Callers pass `Instant`s from
//! their event and tick handlers, which keeps it deterministic under test.

use std::time::{Duration, Instant};

use wavebar_core::config::DEFAULT_RESIZE_DEBOUNCE_MS;

/// Fires once, `delay` after the last trigger of a burst
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_RESIZE_DEBOUNCE_MS))
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay; a pending deadline keeps its original time
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Record an event, pushing the deadline back
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending deadline
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// True exactly once per burst, when the deadline has passed
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fires_once_after_quiescence() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.ready(start));

        debouncer.trigger(start);
        debouncer.trigger(start + 40 * MS);
        debouncer.trigger(start + 80 * MS);

        assert!(!debouncer.ready(start + 120 * MS));
        assert_eq!(debouncer.remaining(start + 120 * MS), Some(60 * MS));
        assert!(debouncer.ready(start + 180 * MS));
        assert!(!debouncer.ready(start + 500 * MS));
    }

    #[test]
    fn test_cancel_drops_pending_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(10 * MS);
        debouncer.trigger(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.ready(start + 20 * MS));
    }
}
