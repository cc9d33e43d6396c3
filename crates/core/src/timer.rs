//! Single restartable retransmission timer.
//!
//! Go-Back-N runs exactly one timer, covering the oldest outstanding
//! frame. In a discrete-event engine an expiry is just a scheduled queue
//! entry, and a scheduled entry cannot be unscheduled cheaply. Instead,
//! each `arm()` issues a fresh generation number and an expiry event carries
//! the generation it was scheduled under. An expiry whose generation is
//! no longer current is stale and must be ignored.
//!
//! # Contract
//!
//! - `arm()` supersedes any earlier schedule and returns the new generation
//! - `disarm()` leaves no live generation
//! - `is_live(gen)` is true only for the generation of the latest `arm()`
//!   with no `disarm()` after it

/// Opaque tag identifying one arming of the timer.
pub type TimerGeneration = u64;

/// The sender's single retransmission timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetransmitTimer {
    armed: bool,
    generation: TimerGeneration,
}

impl RetransmitTimer {
    /// Create a disarmed timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or restart) the timer, superseding any earlier schedule.
    ///
    /// # Returns
    /// The generation to attach to the newly scheduled expiry event.
    pub fn arm(&mut self) -> TimerGeneration {
        self.generation += 1;
        self.armed = true;
        self.generation
    }

    /// Disarm the timer. Any scheduled expiry becomes stale.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether the timer is currently armed.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether an expiry event with this generation is still current.
    pub fn is_live(&self, generation: TimerGeneration) -> bool {
        self.armed && generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disarmed() {
        let timer = RetransmitTimer::new();
        assert!(!timer.is_armed());
        assert!(!timer.is_live(0));
    }

    #[test]
    fn test_arm_returns_live_generation() {
        let mut timer = RetransmitTimer::new();
        let generation = timer.arm();

        assert!(timer.is_armed());
        assert!(timer.is_live(generation));
    }

    #[test]
    fn test_rearm_invalidates_old_generation() {
        let mut timer = RetransmitTimer::new();
        let first = timer.arm();
        let second = timer.arm();

        assert!(!timer.is_live(first));
        assert!(timer.is_live(second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_disarm_kills_all_generations() {
        let mut timer = RetransmitTimer::new();
        let generation = timer.arm();
        timer.disarm();

        assert!(!timer.is_armed());
        assert!(!timer.is_live(generation));
    }

    #[test]
    fn test_rearm_after_disarm() {
        let mut timer = RetransmitTimer::new();
        let old = timer.arm();
        timer.disarm();
        let new = timer.arm();

        assert!(timer.is_live(new));
        assert!(!timer.is_live(old));
    }
}
