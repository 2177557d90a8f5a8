//! Rate limiter for recurring log lines.
//!
//! At 60 fps a per-frame log would drown everything else. A
//! [`LogThrottle`] admits one event per window and counts what it dropped,
//! so the next admitted line can say how many it stands for.

use std::time::{Duration, Instant};

/// Admits at most one event per `window`.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    window: Duration,
    next_deadline: Option<Instant>,
    suppressed: u64,
}

impl LogThrottle {
    /// A throttle with a one-second window.
    pub fn per_second() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            next_deadline: None,
            suppressed: 0,
        }
    }

    /// Whether an event occurring now may be logged.
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Whether an event at `now` may be logged (useful for testing).
    pub fn allow_at(&mut self, now: Instant) -> bool {
        match self.next_deadline {
            Some(deadline) if now < deadline => {
                self.suppressed += 1;
                false
            }
            _ => {
                self.next_deadline = Some(now + self.window);
                true
            }
        }
    }

    /// Take the count of events rejected since the last call.
    pub fn take_suppressed(&mut self) -> u64 {
        std::mem::take(&mut self.suppressed)
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::per_second()
    }
}

// ── Tests ────────────────────────────────────────────────────────
