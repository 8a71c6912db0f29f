//! Restart throttling, computed functionally so timing is testable
//! without real timers.
//!
//! The provider routinely ends sessions on its own (silence, focus
//! changes); the session restarts it, but never more than once per second
//! so a flapping engine cannot spin. A consecutive-restart counter drives
//! a periodic restart-loop diagnostic.

use std::time::{Duration, Instant};

/// Minimum spacing between consecutive provider starts.
pub const RESTART_WINDOW: Duration = Duration::from_millis(1000);

/// Every this many consecutive throttled restarts, log a loop diagnostic.
pub const RESTART_LOOP_REPORT_EVERY: u32 = 10;

/// An error arriving within this long of a start is a platform-level
/// auto-denial rather than a user action.
pub const PERMISSION_BLOCK_THRESHOLD: Duration = Duration::from_millis(200);

/// How the next restart should be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPlan {
    /// Delay before starting the provider again; zero means immediately.
    pub delay: Duration,

    /// The session appears to be stopping and starting repeatedly.
    pub loop_suspected: bool,
}

/// Backoff state: when the provider last started and how many restarts
/// have happened since the last explicit start or abort.
#[derive(Debug, Clone, Default)]
pub struct RestartThrottle {
    last_started_at: Option<Instant>,
    consecutive_restarts: u32,
}

impl RestartThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a provider start.
    pub fn mark_started(&mut self, now: Instant) {
        self.last_started_at = Some(now);
    }

    /// Time since the last recorded start, if any.
    pub fn elapsed_since_start(&self, now: Instant) -> Option<Duration> {
        self.last_started_at
            .map(|started| now.saturating_duration_since(started))
    }

    /// Classify a permission error by how quickly it followed the start.
    pub fn start_was_just_now(&self, now: Instant) -> bool {
        self.elapsed_since_start(now)
            .is_some_and(|elapsed| elapsed < PERMISSION_BLOCK_THRESHOLD)
    }

    /// Plan the next auto-restart after an unexpected end. Counts the
    /// restart and spaces it so starts are at least [`RESTART_WINDOW`]
    /// apart.
    pub fn plan_restart(&mut self, now: Instant) -> RestartPlan {
        self.consecutive_restarts += 1;
        let elapsed = self
            .elapsed_since_start(now)
            .unwrap_or(RESTART_WINDOW);
        RestartPlan {
            delay: RESTART_WINDOW.saturating_sub(elapsed),
            loop_suspected: self.consecutive_restarts % RESTART_LOOP_REPORT_EVERY == 0,
        }
    }

    /// Reset the restart counter (explicit abort or start).
    pub fn reset(&mut self) {
        self.consecutive_restarts = 0;
    }

    pub fn consecutive_restarts(&self) -> u32 {
        self.consecutive_restarts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_within_window_is_delayed() {
        let mut throttle = RestartThrottle::new();
        let t0 = Instant::now();
        throttle.mark_started(t0);

        let plan = throttle.plan_restart(t0 + Duration::from_millis(200));
        assert_eq!(plan.delay, Duration::from_millis(800));
    }

    #[test]
    fn test_restart_after_window_is_immediate() {
        let mut throttle = RestartThrottle::new();
        let t0 = Instant::now();
        throttle.mark_started(t0);

        let plan = throttle.plan_restart(t0 + Duration::from_millis(1500));
        assert_eq!(plan.delay, Duration::ZERO);
    }

    #[test]
    fn test_restart_without_recorded_start_is_immediate() {
        let mut throttle = RestartThrottle::new();
        let plan = throttle.plan_restart(Instant::now());
        assert_eq!(plan.delay, Duration::ZERO);
    }

    #[test]
    fn test_loop_diagnostic_every_tenth_restart() {
        let mut throttle = RestartThrottle::new();
        let t0 = Instant::now();
        throttle.mark_started(t0);

        for i in 1..=25u32 {
            let plan = throttle.plan_restart(t0);
            assert_eq!(plan.loop_suspected, i % 10 == 0, "restart {i}");
        }
    }

    #[test]
    fn test_reset_clears_counter() {
        let mut throttle = RestartThrottle::new();
        let t0 = Instant::now();
        throttle.mark_started(t0);
        for _ in 0..9 {
            throttle.plan_restart(t0);
        }
        throttle.reset();
        assert!(!throttle.plan_restart(t0).loop_suspected);
        assert_eq!(throttle.consecutive_restarts(), 1);
    }

    #[test]
    fn test_permission_block_classification() {
        let mut throttle = RestartThrottle::new();
        let t0 = Instant::now();
        throttle.mark_started(t0);

        assert!(throttle.start_was_just_now(t0 + Duration::from_millis(100)));
        assert!(!throttle.start_was_just_now(t0 + Duration::from_millis(500)));
    }
}
