//! Deadline-based timer primitives polled by the frame loop.
//!
//! Every delayed action in the editor (draft persistence, smart autosave,
//! theme apply, preview scroll mirroring, tab-list re-render coalescing)
//! goes through [`Debounced`]: re-triggering cancels and reschedules, at
//! most one firing is ever pending, and a pending firing can be flushed
//! synchronously at teardown.

use std::time::{Duration, Instant};

/// A single-flight, cancel-and-reschedule delayed action.
///
/// The owner calls [`Debounced::schedule`] on every trigger and polls
/// [`Debounced::take_due`] once per frame; the payload of the most recent
/// schedule is returned exactly once, `delay` after the last trigger.
#[derive(Debug)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Arm (or re-arm) the timer. Any previously pending payload is
    /// replaced and its deadline discarded.
    pub fn schedule(&mut self, now: Instant, payload: T) {
        self.pending = Some((now + self.delay, payload));
    }

    /// Return the payload if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }

    /// Return the pending payload immediately, ignoring the deadline.
    /// Used to guarantee delivery at teardown.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, p)| p)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// A repeating timer for periodic work (interval autosave).
///
/// Unlike [`Debounced`], firing re-arms the timer; a missed frame does not
/// produce a burst of catch-up firings.
#[derive(Debug)]
pub struct IntervalTimer {
    period: Duration,
    next: Instant,
}

impl IntervalTimer {
    pub fn new(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now >= self.next {
            self.next = now + self.period;
            true
        } else {
            false
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let start = Instant::now();
        let mut d = Debounced::new(Duration::from_millis(100));
        d.schedule(start, 1u32);

        assert_eq!(d.take_due(start + Duration::from_millis(50)), None);
        assert_eq!(d.take_due(start + Duration::from_millis(100)), Some(1));
        assert_eq!(d.take_due(start + Duration::from_millis(200)), None);
    }

    #[test]
    fn reschedule_replaces_payload_and_deadline() {
        let start = Instant::now();
        let mut d = Debounced::new(Duration::from_millis(100));
        d.schedule(start, 1u32);
        d.schedule(start + Duration::from_millis(90), 2u32);

        // The first deadline passed, but the re-trigger pushed it out.
        assert_eq!(d.take_due(start + Duration::from_millis(110)), None);
        assert_eq!(d.take_due(start + Duration::from_millis(190)), Some(2));
    }

    #[test]
    fn flush_delivers_pending_immediately() {
        let start = Instant::now();
        let mut d = Debounced::new(Duration::from_secs(60));
        d.schedule(start, "draft");
        assert_eq!(d.flush(), Some("draft"));
        assert!(!d.is_pending());
        assert_eq!(d.flush(), None);
    }

    #[test]
    fn cancel_discards_pending() {
        let start = Instant::now();
        let mut d = Debounced::new(Duration::from_millis(10));
        d.schedule(start, ());
        d.cancel();
        assert_eq!(d.take_due(start + Duration::from_millis(20)), None);
    }

    #[test]
    fn interval_fires_periodically_without_bursts() {
        let start = Instant::now();
        let mut t = IntervalTimer::new(start, Duration::from_millis(100));

        assert!(!t.due(start + Duration::from_millis(99)));
        assert!(t.due(start + Duration::from_millis(100)));
        // A long stall yields a single firing, not a backlog.
        assert!(t.due(start + Duration::from_millis(500)));
        assert!(!t.due(start + Duration::from_millis(501)));
    }
}
