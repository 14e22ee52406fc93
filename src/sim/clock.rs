//! Round countdown clock
//!
//! Counts down in whole steps. Partial deltas accumulate until a full step has passed.

use std::time::Duration;

use crate::consts::CLOCK_STEP;

#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    remaining: Duration,
    /// Time accumulated toward the next step
    carry: Duration,
    running: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the countdown. Discards any partial step.
    pub fn start(&mut self, duration: Duration) {
        self.remaining = duration;
        self.carry = Duration::ZERO;
        self.running = !duration.is_zero();
    }

    /// Halt without changing the remaining time
    pub fn stop(&mut self) {
        self.running = false;
        self.carry = Duration::ZERO;
    }

    /// Advance by `delta`, returning the remaining time
    pub fn tick(&mut self, delta: Duration) -> Duration {
        if !self.running {
            return self.remaining;
        }
        self.carry += delta;
        while self.carry >= CLOCK_STEP && !self.remaining.is_zero() {
            self.carry -= CLOCK_STEP;
            self.remaining = self.remaining.saturating_sub(CLOCK_STEP);
        }
        if self.remaining.is_zero() {
            self.stop();
        }
        self.remaining
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once a started countdown has reached zero
    pub fn expired(&self) -> bool {
        !self.running && self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_whole_seconds() {
        let mut clock = SessionClock::new();
        clock.start(Duration::from_secs(3));
        assert_eq!(clock.tick(Duration::from_millis(900)), Duration::from_secs(3));
        assert_eq!(clock.tick(Duration::from_millis(200)), Duration::from_secs(2));
        assert_eq!(clock.tick(Duration::from_secs(2)), Duration::ZERO);
        assert!(clock.expired());
        assert!(!clock.is_running());
    }

    #[test]
    fn test_restart_discards_carry() {
        let mut clock = SessionClock::new();
        clock.start(Duration::from_secs(5));
        clock.tick(Duration::from_millis(800));
        clock.start(Duration::from_secs(5));
        assert_eq!(clock.tick(Duration::from_millis(800)), Duration::from_secs(5));
    }

    #[test]
    fn test_stopped_clock_ignores_ticks() {
        let mut clock = SessionClock::new();
        clock.start(Duration::from_secs(4));
        clock.stop();
        assert_eq!(clock.tick(Duration::from_secs(10)), Duration::from_secs(4));
        assert!(!clock.expired());
    }
}
