//! Single-slot pending update buffer
//!
//! Rapid content replacements land in one slot; only the latest value is
//! applied once the window has elapsed. A zero window means "on the next
//! tick of the event loop".

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct PendingSlot<T> {
    pending: Option<(T, Instant)>,
    window: Duration,
}

impl<T> PendingSlot<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: None,
            window,
        }
    }

    /// Replace whatever is pending. The window restarts only when the slot
    /// was empty, so a steady stream of updates still flushes.
    pub fn replace(&mut self, value: T, now: Instant) {
        let scheduled_at = match self.pending.take() {
            Some((_, scheduled_at)) => scheduled_at,
            None => now,
        };
        self.pending = Some((value, scheduled_at));
    }

    /// Drop the pending value without applying it
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the value if its window has elapsed
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, scheduled_at)) if now.duration_since(*scheduled_at) >= self.window => {
                self.take()
            }
            _ => None,
        }
    }

    /// Take the value regardless of the window
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_wins() {
        let now = Instant::now();
        let mut slot = PendingSlot::new(Duration::ZERO);
        slot.replace(1, now);
        slot.replace(2, now);
        slot.replace(3, now);
        assert_eq!(slot.take_due(now), Some(3));
        assert_eq!(slot.take_due(now), None);
    }

    #[test]
    fn test_window_delays_flush() {
        let start = Instant::now();
        let mut slot = PendingSlot::new(Duration::from_millis(10));
        slot.replace("a", start);
        assert_eq!(slot.take_due(start + Duration::from_millis(5)), None);
        assert!(slot.is_pending());
        assert_eq!(slot.take_due(start + Duration::from_millis(10)), Some("a"));
    }

    #[test]
    fn test_replace_keeps_original_schedule() {
        let start = Instant::now();
        let mut slot = PendingSlot::new(Duration::from_millis(10));
        slot.replace("a", start);
        slot.replace("b", start + Duration::from_millis(8));
        assert_eq!(slot.take_due(start + Duration::from_millis(10)), Some("b"));
    }

    #[test]
    fn test_cancel() {
        let mut slot = PendingSlot::new(Duration::ZERO);
        assert!(!slot.cancel());
        slot.replace((), Instant::now());
        assert!(slot.cancel());
        assert!(!slot.is_pending());
    }
}
