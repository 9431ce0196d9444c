//! Leading-edge flush throttle
//!
//! At most one flush runs per interval, measured from the start of the
//! previous flush that actually ran. Requests inside the window are dropped,
//! not deferred; the next request after the window fires immediately.

/// Timestamp-comparison throttle; no timers involved
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: u64,
    last_fired: Option<u64>,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired: None,
        }
    }

    /// Returns true (and records `now`) if a flush may run now
    pub fn try_fire(&mut self, now: u64) -> bool {
        let allowed = match self.last_fired {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval_ms,
        };

        if allowed {
            self.last_fired = Some(now);
        }
        allowed
    }

    /// When the last permitted flush started
    pub fn last_fired(&self) -> Option<u64> {
        self.last_fired
    }
}
