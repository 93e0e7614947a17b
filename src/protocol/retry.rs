//! Per-state retry/timeout tick counter.
//!
//! One `RetryTimer` instance lives in the engine context and is reset on
//! every entry into a timed state (`Pairing` or `Syncing`). Each control
//! tick it reports whether the active role should re-emit its outstanding
//! request, or whether the attempt should be abandoned. The initial request
//! is sent by the state's `on_enter`, not by the timer.

/// What the current tick requires of the state handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryEvent {
    /// Keep waiting.
    None,
    /// Counter hit an exact multiple of the resend interval.
    Resend,
    /// Counter first exceeded the timeout. Reported exactly once.
    Expired,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryTimer {
    count: u32,
    resend_interval: u32,
    timeout: u32,
    expired_reported: bool,
}

impl RetryTimer {
    pub fn new(resend_interval: u32, timeout: u32) -> Self {
        debug_assert!(resend_interval > 0, "resend interval must be non-zero");
        Self {
            count: 0,
            resend_interval: resend_interval.max(1),
            timeout,
            expired_reported: false,
        }
    }

    /// Restart the counter for a fresh state entry.
    pub fn reset(&mut self, resend_interval: u32, timeout: u32) {
        *self = Self::new(resend_interval, timeout);
    }

    /// Advance one control tick.
    pub fn advance(&mut self) -> RetryEvent {
        self.count += 1;
        if self.expired_reported {
            return RetryEvent::None;
        }
        if self.count > self.timeout {
            self.expired_reported = true;
            return RetryEvent::Expired;
        }
        if self.count % self.resend_interval == 0 {
            return RetryEvent::Resend;
        }
        RetryEvent::None
    }

    /// Ticks elapsed since the last reset.
    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resend_fires_exactly_at_multiples() {
        let mut t = RetryTimer::new(20, 600);
        for tick in 1..=600u32 {
            let event = t.advance();
            if tick % 20 == 0 {
                assert_eq!(event, RetryEvent::Resend, "tick {tick}");
            } else {
                assert_eq!(event, RetryEvent::None, "tick {tick}");
            }
        }
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut t = RetryTimer::new(20, 600);
        for _ in 0..600 {
            assert_ne!(t.advance(), RetryEvent::Expired);
        }
        assert_eq!(t.advance(), RetryEvent::Expired);
        for _ in 0..100 {
            assert_eq!(t.advance(), RetryEvent::None);
        }
    }

    #[test]
    fn reset_rearms_both_thresholds() {
        let mut t = RetryTimer::new(2, 3);
        assert_eq!(t.advance(), RetryEvent::None);
        assert_eq!(t.advance(), RetryEvent::Resend);
        assert_eq!(t.advance(), RetryEvent::None);
        assert_eq!(t.advance(), RetryEvent::Expired);
        t.reset(2, 3);
        assert_eq!(t.count(), 0);
        assert_eq!(t.advance(), RetryEvent::None);
        assert_eq!(t.advance(), RetryEvent::Resend);
    }

    #[test]
    fn timeout_on_resend_boundary_still_resends_first() {
        // With timeout 40 and interval 20 the tick-40 resend precedes the
        // tick-41 expiry.
        let mut t = RetryTimer::new(20, 40);
        let mut events = Vec::new();
        for _ in 0..42 {
            events.push(t.advance());
        }
        assert_eq!(events[19], RetryEvent::Resend);
        assert_eq!(events[39], RetryEvent::Resend);
        assert_eq!(events[40], RetryEvent::Expired);
        assert_eq!(events[41], RetryEvent::None);
    }
}
