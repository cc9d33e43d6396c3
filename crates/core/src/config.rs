//! Simulation parameters and validation.
//!
//! A [`SimConfig`] fully describes a run: protocol parameters (frame
//! count, window size, timeout), channel impairment policies for both
//! directions, transit timings, and the seed that makes the run
//! reproducible.
//!
//! # Validation
//!
//! `validate()` enforces the engine-level floors: at least one frame, a
//! window of at least one, a positive timeout, probabilities inside the
//! unit interval, and well-formed policies. Anything stricter (input
//! ranges a front-end might clamp to) is the driver's business.

use crate::error::ConfigError;
use crate::policy::{DelayPolicy, LossPolicy};

/// Complete configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    // === Protocol ===
    /// Number of frames the sender must deliver (sequence space `0..frame_count`)
    pub frame_count: u32,

    /// Maximum outstanding (sent but unacknowledged) frames
    pub window_size: u32,

    /// Retransmission timeout in simulated milliseconds
    pub timeout_ms: u64,

    // === Frame path (sender -> receiver) ===
    /// Loss policy applied to each frame transmission attempt
    pub frame_loss: LossPolicy,

    /// Extra-delay policy applied to matching frames, orthogonal to loss
    pub frame_delay: DelayPolicy,

    /// Base transit time for a frame in simulated milliseconds
    pub frame_transit_ms: u64,

    // === ACK path (receiver -> sender) ===
    /// Probability that any given ACK is lost, in `0.0..=1.0`
    pub ack_loss: f64,

    /// Fixed extra delay added to every ACK's transit, in milliseconds
    pub ack_delay_ms: u64,

    /// Receiver turnaround time between frame arrival and ACK emission
    pub process_ms: u64,

    /// Base transit time for an ACK in simulated milliseconds
    pub ack_transit_ms: u64,

    // === Reproducibility ===
    /// Master seed; both channel directions derive their streams from it
    pub seed: u64,
}

impl SimConfig {
    /// Create a configuration with no impairments (perfect channel).
    ///
    /// Transit timings keep their defaults; only loss, extra delay, and
    /// the ACK delay are zeroed.
    pub fn perfect() -> Self {
        Self {
            frame_loss: LossPolicy::None,
            frame_delay: DelayPolicy::None,
            ack_loss: 0.0,
            ack_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Check all parameters, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_count < 1 {
            return Err(ConfigError::FrameCount(self.frame_count));
        }
        if self.window_size < 1 {
            return Err(ConfigError::WindowSize(self.window_size));
        }
        if self.timeout_ms < 1 {
            return Err(ConfigError::Timeout(self.timeout_ms));
        }
        self.frame_loss.validate()?;
        self.frame_delay.validate()?;
        if !(0.0..=1.0).contains(&self.ack_loss) {
            return Err(ConfigError::Probability(self.ack_loss));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    /// Defaults for an interesting demo run: moderate random frame loss,
    /// light ACK loss, and a noticeable ACK delay.
    fn default() -> Self {
        Self {
            frame_count: 12,
            window_size: 4,
            timeout_ms: 6000,
            frame_loss: LossPolicy::Random { probability: 0.15 },
            frame_delay: DelayPolicy::None,
            frame_transit_ms: 2000,
            ack_loss: 0.05,
            ack_delay_ms: 800,
            process_ms: 600,
            ack_transit_ms: 2000,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_perfect_is_valid() {
        let config = SimConfig::perfect();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_loss, LossPolicy::None);
        assert_eq!(config.ack_loss, 0.0);
        assert_eq!(config.ack_delay_ms, 0);
    }

    #[test]
    fn test_zero_frame_count_rejected() {
        let config = SimConfig {
            frame_count: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::FrameCount(0)));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = SimConfig {
            window_size: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::WindowSize(0)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = SimConfig {
            timeout_ms: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Timeout(0)));
    }

    #[test]
    fn test_ack_loss_out_of_range_rejected() {
        let config = SimConfig {
            ack_loss: 1.5,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Probability(1.5)));
    }

    #[test]
    fn test_bad_frame_policy_rejected() {
        let config = SimConfig {
            frame_loss: LossPolicy::Random { probability: -0.1 },
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            frame_loss: LossPolicy::EveryK { k: 0 },
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Interval));
    }
}
