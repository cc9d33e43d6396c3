//! Loss and delay decision strategies for the channel model.
//!
//! Policies are evaluated once per transmission attempt and the verdict is
//! frozen into the scheduled channel event; nothing is re-rolled later.
//!
//! # Strategies
//!
//! - `None`: never matches
//! - `Random { probability }`: independent Bernoulli roll per attempt
//! - `Specific { seqs }`: matches listed sequence numbers
//! - `EveryK { k }`: matches when `(seq + 1) % k == 0`, i.e. every k-th
//!   frame counting from 1
//!
//! Deterministic modes (`Specific`, `EveryK`) match only the *first*
//! attempt of a sequence number; retransmissions of a matched frame pass.
//! `Random` rolls independently for every attempt.
//!
//! Sequence numbers outside the run's range are allowed in `Specific`
//! lists; they simply never match.

use crate::error::ConfigError;
use crate::SeqNo;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// When to drop a transmission.
#[derive(Debug, Clone, PartialEq)]
pub enum LossPolicy {
    /// Never drop
    None,

    /// Drop each attempt independently with the given probability
    Random { probability: f64 },

    /// Drop the first attempt of each listed sequence number
    Specific { seqs: Vec<SeqNo> },

    /// Drop the first attempt of every k-th frame (`(seq + 1) % k == 0`)
    EveryK { k: u32 },
}

impl LossPolicy {
    /// Decide whether this attempt is dropped.
    ///
    /// `attempt` counts from 1 for the first transmission of a frame.
    /// Only `Random` consumes randomness.
    pub fn should_drop(&self, seq: SeqNo, attempt: u32, rng: &mut ChaCha8Rng) -> bool {
        match self {
            LossPolicy::None => false,
            LossPolicy::Random { probability } => {
                if *probability <= 0.0 {
                    return false;
                }
                let roll: f64 = rng.gen();
                roll < *probability
            }
            LossPolicy::Specific { seqs } => attempt == 1 && seqs.contains(&seq),
            LossPolicy::EveryK { k } => attempt == 1 && *k >= 1 && (seq + 1) % k == 0,
        }
    }

    /// Check policy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            LossPolicy::None => Ok(()),
            LossPolicy::Random { probability } => {
                if (0.0..=1.0).contains(probability) {
                    Ok(())
                } else {
                    Err(ConfigError::Probability(*probability))
                }
            }
            LossPolicy::Specific { seqs } => {
                if seqs.is_empty() {
                    Err(ConfigError::EmptySet)
                } else {
                    Ok(())
                }
            }
            LossPolicy::EveryK { k } => {
                if *k < 1 {
                    Err(ConfigError::Interval)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Extra transit delay for matching frames, independent of loss.
///
/// Deterministic in the sequence number: a matching frame is slowed on
/// every attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DelayPolicy {
    /// No extra delay
    None,

    /// Add `extra_ms` to the listed sequence numbers
    Specific { seqs: Vec<SeqNo>, extra_ms: u64 },

    /// Add `extra_ms` to every k-th frame (`(seq + 1) % k == 0`)
    EveryK { k: u32, extra_ms: u64 },
}

impl DelayPolicy {
    /// Extra transit milliseconds for this frame, 0 when it doesn't match.
    pub fn extra_ms(&self, seq: SeqNo) -> u64 {
        match self {
            DelayPolicy::None => 0,
            DelayPolicy::Specific { seqs, extra_ms } => {
                if seqs.contains(&seq) {
                    *extra_ms
                } else {
                    0
                }
            }
            DelayPolicy::EveryK { k, extra_ms } => {
                if *k >= 1 && (seq + 1) % k == 0 {
                    *extra_ms
                } else {
                    0
                }
            }
        }
    }

    /// Check policy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DelayPolicy::None => Ok(()),
            DelayPolicy::Specific { seqs, .. } => {
                if seqs.is_empty() {
                    Err(ConfigError::EmptySet)
                } else {
                    Ok(())
                }
            }
            DelayPolicy::EveryK { k, .. } => {
                if *k < 1 {
                    Err(ConfigError::Interval)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_none_never_drops() {
        let mut r = rng(42);
        let policy = LossPolicy::None;
        for seq in 0..100 {
            assert!(!policy.should_drop(seq, 1, &mut r));
        }
    }

    #[test]
    fn test_random_extremes() {
        let mut r = rng(42);

        let never = LossPolicy::Random { probability: 0.0 };
        let always = LossPolicy::Random { probability: 1.0 };

        for seq in 0..100 {
            assert!(!never.should_drop(seq, 1, &mut r));
            assert!(always.should_drop(seq, 1, &mut r));
        }
    }

    #[test]
    fn test_random_approximate_rate() {
        let mut r = rng(42);
        let policy = LossPolicy::Random { probability: 0.3 };

        let dropped = (0..1000)
            .filter(|&seq| policy.should_drop(seq, 1, &mut r))
            .count();

        // Allow a generous band around 300 for randomness
        assert!(dropped > 200 && dropped < 400, "dropped {dropped} of 1000");
    }

    #[test]
    fn test_random_deterministic_per_seed() {
        let policy = LossPolicy::Random { probability: 0.5 };

        let mut r1 = rng(12345);
        let mut r2 = rng(12345);

        for seq in 0..50 {
            assert_eq!(
                policy.should_drop(seq, 1, &mut r1),
                policy.should_drop(seq, 1, &mut r2)
            );
        }
    }

    #[test]
    fn test_specific_first_attempt_only() {
        let mut r = rng(42);
        let policy = LossPolicy::Specific { seqs: vec![2, 7] };

        assert!(policy.should_drop(2, 1, &mut r));
        assert!(policy.should_drop(7, 1, &mut r));
        assert!(!policy.should_drop(3, 1, &mut r));

        // Retransmissions of a matched frame pass
        assert!(!policy.should_drop(2, 2, &mut r));
        assert!(!policy.should_drop(7, 3, &mut r));
    }

    #[test]
    fn test_every_k_pattern() {
        let mut r = rng(42);
        let policy = LossPolicy::EveryK { k: 3 };

        let matched: Vec<SeqNo> = (0..9)
            .filter(|&seq| policy.should_drop(seq, 1, &mut r))
            .collect();
        assert_eq!(matched, vec![2, 5, 8]);

        // Second attempts pass
        assert!(!policy.should_drop(2, 2, &mut r));
    }

    #[test]
    fn test_every_one_drops_each_first_attempt() {
        let mut r = rng(42);
        let policy = LossPolicy::EveryK { k: 1 };

        for seq in 0..10 {
            assert!(policy.should_drop(seq, 1, &mut r));
            assert!(!policy.should_drop(seq, 2, &mut r));
        }
    }

    #[test]
    fn test_delay_specific() {
        let policy = DelayPolicy::Specific {
            seqs: vec![1, 4],
            extra_ms: 1500,
        };

        assert_eq!(policy.extra_ms(1), 1500);
        assert_eq!(policy.extra_ms(4), 1500);
        assert_eq!(policy.extra_ms(0), 0);
        assert_eq!(policy.extra_ms(2), 0);
    }

    #[test]
    fn test_delay_every_k() {
        let policy = DelayPolicy::EveryK { k: 2, extra_ms: 900 };

        assert_eq!(policy.extra_ms(0), 0);
        assert_eq!(policy.extra_ms(1), 900);
        assert_eq!(policy.extra_ms(2), 0);
        assert_eq!(policy.extra_ms(3), 900);
    }

    #[test]
    fn test_validation() {
        assert!(LossPolicy::Random { probability: 1.1 }.validate().is_err());
        assert!(LossPolicy::Random { probability: -0.5 }.validate().is_err());
        assert!(LossPolicy::Random { probability: 0.5 }.validate().is_ok());

        assert!(LossPolicy::Specific { seqs: vec![] }.validate().is_err());
        assert!(LossPolicy::Specific { seqs: vec![0] }.validate().is_ok());

        assert!(LossPolicy::EveryK { k: 0 }.validate().is_err());
        assert!(LossPolicy::EveryK { k: 1 }.validate().is_ok());

        assert!(DelayPolicy::Specific {
            seqs: vec![],
            extra_ms: 100
        }
        .validate()
        .is_err());
        assert!(DelayPolicy::EveryK { k: 0, extra_ms: 100 }.validate().is_err());
    }
}
