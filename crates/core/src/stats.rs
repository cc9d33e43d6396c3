//! Run statistics: counters and derived ratios.
//!
//! Counters are monotone over a run and updated synchronously by the
//! engine as it processes events; nothing here talks to the clock or the
//! channel. `reset()` on the engine starts a fresh struct.
//!
//! # Counting rules
//!
//! - `total_transmissions`: every frame submission, first attempts and
//!   retransmissions alike
//! - `frames_lost`: frame-direction channel drops (a frame the receiver
//!   discards as out-of-order is *not* lost)
//! - `frames_delivered`: frames accepted in order by the receiver
//! - `total_acks`: ACK decisions that produced a transmission attempt,
//!   counted before the channel gets a chance to drop them
//! - `acks_lost`: ACK-direction channel drops

use crate::SimTime;

/// Counters for one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Number of frames this run set out to deliver
    pub total_frames: u32,

    /// Frame transmission attempts submitted to the channel
    pub total_transmissions: u64,

    /// ACK transmission attempts submitted to the channel
    pub total_acks: u64,

    /// Frames accepted in order by the receiver
    pub frames_delivered: u64,

    /// Frame attempts dropped by the channel
    pub frames_lost: u64,

    /// ACKs dropped by the channel
    pub acks_lost: u64,

    /// Simulated time at which the run completed, if it has
    pub finished_ms: Option<SimTime>,
}

impl RunStats {
    /// Create zeroed counters for a run over `total_frames` frames.
    pub fn new(total_frames: u32) -> Self {
        Self {
            total_frames,
            ..Self::default()
        }
    }

    /// Fraction of transmissions that were useful (delivered / sent).
    ///
    /// 1.0 means every transmission was accepted in order; guarded so an
    /// untouched run reports 0.0 rather than dividing by zero.
    pub fn efficiency(&self) -> f64 {
        self.frames_delivered as f64 / self.total_transmissions.max(1) as f64
    }

    /// Fraction of frame transmissions the channel dropped.
    pub fn loss_rate(&self) -> f64 {
        self.frames_lost as f64 / self.total_transmissions.max(1) as f64
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("Frames: {}", self.total_frames);
        if let Some(finished) = self.finished_ms {
            println!("Completed at: {} ms (simulated)", finished);
        } else {
            println!("Completed at: (run not finished)");
        }
        println!();
        println!("Transmissions: {}", self.total_transmissions);
        println!(
            "Frames lost: {} ({:.1}%)",
            self.frames_lost,
            self.loss_rate() * 100.0
        );
        println!("Frames delivered: {}", self.frames_delivered);
        println!("ACKs generated: {}", self.total_acks);
        println!("ACKs lost: {}", self.acks_lost);
        println!();
        println!("Efficiency: {:.1}%", self.efficiency() * 100.0);
    }

    /// Export as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "total_frames={}\n\
             total_transmissions={}\n\
             frames_lost={}\n\
             frames_delivered={}\n\
             total_acks={}\n\
             acks_lost={}\n\
             efficiency={:.4}\n\
             loss_rate={:.4}\n",
            self.total_frames,
            self.total_transmissions,
            self.frames_lost,
            self.frames_delivered,
            self.total_acks,
            self.acks_lost,
            self.efficiency(),
            self.loss_rate(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_is_zeroed() {
        let stats = RunStats::new(12);
        assert_eq!(stats.total_frames, 12);
        assert_eq!(stats.total_transmissions, 0);
        assert_eq!(stats.efficiency(), 0.0);
        assert_eq!(stats.loss_rate(), 0.0);
        assert!(stats.finished_ms.is_none());
    }

    #[test]
    fn test_efficiency() {
        let stats = RunStats {
            total_frames: 5,
            total_transmissions: 7,
            frames_delivered: 5,
            ..RunStats::default()
        };

        let expected = 5.0 / 7.0;
        assert!((stats.efficiency() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_loss_rate() {
        let stats = RunStats {
            total_transmissions: 20,
            frames_lost: 5,
            ..RunStats::default()
        };

        assert_eq!(stats.loss_rate(), 0.25);
    }

    #[test]
    fn test_export_text() {
        let stats = RunStats {
            total_frames: 5,
            total_transmissions: 7,
            frames_delivered: 5,
            frames_lost: 1,
            total_acks: 6,
            ..RunStats::default()
        };

        let text = stats.export_text();
        assert!(text.contains("total_transmissions=7"));
        assert!(text.contains("frames_lost=1"));
        assert!(text.contains("total_acks=6"));
    }
}
