//! One-way unreliable link with deterministic, seeded impairments.
//!
//! A `Channel` turns each submitted transmission into a frozen verdict:
//! dropped or not, and the simulated instant it would arrive. The verdict
//! is computed exactly once, at submit time; retransmissions are new
//! submissions with fresh verdicts. Scheduling the arrival (or recording
//! the loss) against the clock is the engine's job; the channel holds no
//! queue and never advances time.
//!
//! The engine owns one instance per direction: frames sender -> receiver,
//! ACKs receiver -> sender. Each instance carries its own ChaCha8 stream,
//! so the two directions draw from independent randomness and a policy
//! change on one path leaves the other path's rolls untouched.
//!
//! # Determinism
//!
//! The same seed and policies over the same submission order produce
//! identical verdicts.

use crate::policy::{DelayPolicy, LossPolicy};
use crate::{SeqNo, SimTime};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Frozen verdict for one transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transit {
    /// Whether the channel drops this attempt
    pub dropped: bool,

    /// When the attempt arrives; for a dropped attempt, when the loss
    /// is observed (the would-be arrival instant)
    pub arrival: SimTime,
}

/// A directed link applying loss and delay policies per attempt.
#[derive(Debug)]
pub struct Channel {
    base_delay_ms: u64,
    loss: LossPolicy,
    delay: DelayPolicy,
    rng: ChaCha8Rng,
}

impl Channel {
    /// Create a channel with the given impairments and its own RNG stream.
    pub fn new(base_delay_ms: u64, loss: LossPolicy, delay: DelayPolicy, seed: u64) -> Self {
        Self {
            base_delay_ms,
            loss,
            delay,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Submit one transmission attempt and freeze its verdict.
    ///
    /// `attempt` counts from 1; deterministic loss policies use it to let
    /// retransmissions through.
    pub fn transmit(&mut self, seq: SeqNo, attempt: u32, now: SimTime) -> Transit {
        let dropped = self.loss.should_drop(seq, attempt, &mut self.rng);
        let arrival = now + self.base_delay_ms + self.delay.extra_ms(seq);
        Transit { dropped, arrival }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_channel_delivers_after_base_delay() {
        let mut channel = Channel::new(2000, LossPolicy::None, DelayPolicy::None, 42);

        let transit = channel.transmit(0, 1, 1000);
        assert!(!transit.dropped);
        assert_eq!(transit.arrival, 3000);
    }

    #[test]
    fn test_delay_policy_slows_matching_frames() {
        let delay = DelayPolicy::Specific {
            seqs: vec![1],
            extra_ms: 1500,
        };
        let mut channel = Channel::new(2000, LossPolicy::None, delay, 42);

        assert_eq!(channel.transmit(0, 1, 0).arrival, 2000);
        assert_eq!(channel.transmit(1, 1, 0).arrival, 3500);
        assert_eq!(channel.transmit(2, 1, 0).arrival, 2000);
    }

    #[test]
    fn test_specific_loss_spares_retransmission() {
        let loss = LossPolicy::Specific { seqs: vec![2] };
        let mut channel = Channel::new(2000, loss, DelayPolicy::None, 42);

        assert!(channel.transmit(2, 1, 0).dropped);
        assert!(!channel.transmit(2, 2, 0).dropped);
        assert!(!channel.transmit(3, 1, 0).dropped);
    }

    #[test]
    fn test_dropped_attempt_still_has_arrival_instant() {
        let loss = LossPolicy::Random { probability: 1.0 };
        let mut channel = Channel::new(500, loss, DelayPolicy::None, 42);

        let transit = channel.transmit(0, 1, 100);
        assert!(transit.dropped);
        assert_eq!(transit.arrival, 600);
    }

    #[test]
    fn test_same_seed_same_verdicts() {
        let loss = LossPolicy::Random { probability: 0.5 };

        let mut a = Channel::new(0, loss.clone(), DelayPolicy::None, 12345);
        let mut b = Channel::new(0, loss, DelayPolicy::None, 12345);

        for seq in 0..50 {
            assert_eq!(a.transmit(seq, 1, 0), b.transmit(seq, 1, 0));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let loss = LossPolicy::Random { probability: 0.5 };

        let mut a = Channel::new(0, loss.clone(), DelayPolicy::None, 1);
        let mut b = Channel::new(0, loss, DelayPolicy::None, 2);

        let verdicts_a: Vec<bool> = (0..64).map(|seq| a.transmit(seq, 1, 0).dropped).collect();
        let verdicts_b: Vec<bool> = (0..64).map(|seq| b.transmit(seq, 1, 0).dropped).collect();

        assert_ne!(verdicts_a, verdicts_b);
    }
}
