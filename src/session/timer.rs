//! Timers owned by the state they drive.
//!
//! Nothing here schedules callbacks. The owner polls with the current
//! `Instant`, so cancelling is just clearing a field and a cancelled timer can
//! never fire into state that has since been replaced.

use std::time::{Duration, Instant};

/// Frames longer than this are clamped so a stalled terminal does not teleport
/// every falling word off the field at once.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Change the period. A running interval restarts from `now`.
    pub fn set_period(&mut self, period: Duration, now: Instant) {
        self.period = period.max(Duration::from_millis(1));
        if self.is_active() {
            self.start(now);
        }
    }

    /// Number of periods that elapsed since the last poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }
}

/// Measures the time between consecutive frames.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed time since the previous call, zero on the first one.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        dt.min(MAX_FRAME_DT)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// `m:ss` rendering of a duration.
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
