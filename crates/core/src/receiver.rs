//! Go-Back-N receiver: in-order acceptance and cumulative ACKs.
//!
//! The receiver holds a single counter, `expected`. A frame is accepted
//! only when its sequence number equals `expected`; anything else is
//! discarded and answered with a cumulative ACK for the highest in-order
//! frame so far (`expected - 1`). Before any frame has been accepted
//! there is no such frame, so a mismatched arrival produces no ACK at
//! all, never a negative sequence number.
//!
//! This module only decides; transmitting the ACK through the channel is
//! the engine's job.

use crate::SeqNo;

/// Outcome of one frame arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDecision {
    /// Whether the frame was accepted (in order) or discarded
    pub accepted: bool,

    /// Cumulative ACK to transmit, if any
    pub ack: Option<SeqNo>,
}

/// Receiver-side protocol state.
#[derive(Debug, Default)]
pub struct Receiver {
    expected: SeqNo,
}

impl Receiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next sequence number the receiver will accept.
    pub fn expected(&self) -> SeqNo {
        self.expected
    }

    /// Handle a frame arrival and decide on the ACK.
    ///
    /// `expected` advances by exactly 1 on acceptance and not otherwise.
    pub fn on_frame(&mut self, seq: SeqNo) -> FrameDecision {
        if seq == self.expected {
            self.expected += 1;
            FrameDecision {
                accepted: true,
                ack: Some(seq),
            }
        } else if self.expected == 0 {
            // No frame accepted yet, so there is no cumulative ACK to repeat
            FrameDecision {
                accepted: false,
                ack: None,
            }
        } else {
            FrameDecision {
                accepted: false,
                ack: Some(self.expected - 1),
            }
        }
    }

    /// Forget everything; the next acceptable frame is 0 again.
    pub fn reset(&mut self) {
        self.expected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_acceptance() {
        let mut receiver = Receiver::new();

        for seq in 0..5 {
            let decision = receiver.on_frame(seq);
            assert!(decision.accepted);
            assert_eq!(decision.ack, Some(seq));
            assert_eq!(receiver.expected(), seq + 1);
        }
    }

    #[test]
    fn test_out_of_order_discarded_with_cumulative_ack() {
        let mut receiver = Receiver::new();
        receiver.on_frame(0);
        receiver.on_frame(1);

        // Frame 3 arrives while 2 is expected
        let decision = receiver.on_frame(3);
        assert!(!decision.accepted);
        assert_eq!(decision.ack, Some(1));
        assert_eq!(receiver.expected(), 2);
    }

    #[test]
    fn test_duplicate_discarded_with_cumulative_ack() {
        let mut receiver = Receiver::new();
        receiver.on_frame(0);
        receiver.on_frame(1);

        // Frame 0 again (a retransmitted duplicate)
        let decision = receiver.on_frame(0);
        assert!(!decision.accepted);
        assert_eq!(decision.ack, Some(1));
        assert_eq!(receiver.expected(), 2);
    }

    #[test]
    fn test_no_ack_before_first_acceptance() {
        let mut receiver = Receiver::new();

        // Frame 2 arrives but nothing has ever been accepted
        let decision = receiver.on_frame(2);
        assert!(!decision.accepted);
        assert_eq!(decision.ack, None);
        assert_eq!(receiver.expected(), 0);
    }

    #[test]
    fn test_recovers_after_gap() {
        let mut receiver = Receiver::new();
        receiver.on_frame(0);

        // Gap: 2 arrives before 1
        assert!(!receiver.on_frame(2).accepted);

        // Retransmitted in order
        assert!(receiver.on_frame(1).accepted);
        assert!(receiver.on_frame(2).accepted);
        assert_eq!(receiver.expected(), 3);
    }

    #[test]
    fn test_reset() {
        let mut receiver = Receiver::new();
        receiver.on_frame(0);
        receiver.on_frame(1);

        receiver.reset();
        assert_eq!(receiver.expected(), 0);
        assert!(receiver.on_frame(0).accepted);
    }
}
