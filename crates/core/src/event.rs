//! Observable engine events.
//!
//! The engine pushes one of these for every protocol action; consumers
//! drain them (with their simulated timestamps) and render however they
//! like. The event stream is the whole observable surface: a front end
//! needs nothing else to animate a run.

use crate::stats::RunStats;
use crate::SeqNo;
use std::fmt;
use std::ops::Range;

/// One observable protocol action.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A frame attempt was submitted to the channel
    FrameSent { seq: SeqNo, attempt: u32 },

    /// A frame arrived in order and was accepted by the receiver
    FrameDelivered { seq: SeqNo },

    /// A frame arrived out of order and was discarded
    FrameDiscarded { seq: SeqNo, expected: SeqNo },

    /// A frame attempt was dropped by the channel
    FrameLost { seq: SeqNo, attempt: u32 },

    /// An ACK was submitted to the channel
    AckSent { ack: SeqNo },

    /// An ACK was dropped by the channel
    AckLost { ack: SeqNo },

    /// An ACK reached the sender and slid the window
    AckApplied { ack: SeqNo, new_base: SeqNo },

    /// The retransmission timer fired; the outstanding range goes again
    Timeout {
        base: SeqNo,
        retransmitted: Range<SeqNo>,
    },

    /// Every frame is acknowledged; final statistics attached
    Completed { stats: RunStats },
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::FrameSent { seq, attempt } => {
                if *attempt == 1 {
                    write!(f, "frame {seq} sent")
                } else {
                    write!(f, "frame {seq} retransmitted (attempt {attempt})")
                }
            }
            EngineEvent::FrameDelivered { seq } => write!(f, "frame {seq} delivered in order"),
            EngineEvent::FrameDiscarded { seq, expected } => {
                write!(f, "frame {seq} discarded, receiver expects {expected}")
            }
            EngineEvent::FrameLost { seq, attempt } => {
                write!(f, "frame {seq} lost in transit (attempt {attempt})")
            }
            EngineEvent::AckSent { ack } => write!(f, "ack {ack} sent"),
            EngineEvent::AckLost { ack } => write!(f, "ack {ack} lost in transit"),
            EngineEvent::AckApplied { ack, new_base } => {
                write!(f, "ack {ack} applied, base now {new_base}")
            }
            EngineEvent::Timeout {
                base,
                retransmitted,
            } => write!(
                f,
                "timeout at base {base}, retransmitting {}..{}",
                retransmitted.start, retransmitted.end
            ),
            EngineEvent::Completed { stats } => write!(
                f,
                "run completed: {}/{} frames delivered in {} transmissions",
                stats.frames_delivered, stats.total_frames, stats.total_transmissions
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_first_send_vs_retransmission() {
        let first = EngineEvent::FrameSent { seq: 3, attempt: 1 };
        let retry = EngineEvent::FrameSent { seq: 3, attempt: 2 };

        assert_eq!(first.to_string(), "frame 3 sent");
        assert_eq!(retry.to_string(), "frame 3 retransmitted (attempt 2)");
    }

    #[test]
    fn test_display_timeout_range() {
        let event = EngineEvent::Timeout {
            base: 2,
            retransmitted: 2..4,
        };
        assert_eq!(event.to_string(), "timeout at base 2, retransmitting 2..4");
    }

    #[test]
    fn test_display_completed() {
        let stats = RunStats {
            total_frames: 5,
            frames_delivered: 5,
            total_transmissions: 7,
            ..RunStats::default()
        };
        let event = EngineEvent::Completed { stats };
        assert_eq!(
            event.to_string(),
            "run completed: 5/5 frames delivered in 7 transmissions"
        );
    }
}
