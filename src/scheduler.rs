//! Delay scheduling seam.
//!
//! Retry pacing never sleeps inline. The activation loop asks a [`Scheduler`]
//! to account for each delay, so the host binds real timers while tests use
//! [`VirtualScheduler`] and assert on accumulated virtual time.

use std::time::Duration;

/// Owns the passage of time between retry attempts.
pub trait Scheduler {
    /// Account for `delay` passing before the next attempt.
    fn schedule_after(&mut self, delay: Duration);

    /// Total delay scheduled so far.
    fn elapsed(&self) -> Duration;
}

/// Test scheduler: accumulates requested delays without waiting.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    elapsed: Duration,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        VirtualScheduler::default()
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_after(&mut self, delay: Duration) {
        self.elapsed += delay;
    }

    fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_scheduler_accumulates() {
        let mut s = VirtualScheduler::new();
        assert_eq!(s.elapsed(), Duration::ZERO);
        s.schedule_after(Duration::from_millis(300));
        s.schedule_after(Duration::from_millis(700));
        assert_eq!(s.elapsed(), Duration::from_secs(1));
    }
}
