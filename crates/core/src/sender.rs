//! Go-Back-N sender window bookkeeping.
//!
//! # Window layout
//!
//! ```text
//!     0   1   2   3   4   5   6   7
//!   +---+---+---+---+---+---+---+---+
//!   | a | a | o | o | o | . | . | . |
//!   +---+---+---+---+---+---+---+---+
//!             ^           ^
//!           base       next_seq          (window_size = 4)
//! ```
//!
//! `a` acknowledged, `o` outstanding, `.` unsent. Outstanding frames live
//! in `[base, next_seq)`; a new frame is admissible while fewer than
//! `window_size` frames are outstanding and sequence numbers remain.
//!
//! # Protocol contract
//!
//! - `pump()` admits frames until the window is full or the run is out of
//!   sequence numbers; idempotent once neither holds.
//! - A cumulative ACK for `ack >= base` slides the window to `ack + 1`;
//!   an ACK below `base` is stale and changes nothing.
//! - On timeout every outstanding frame is retransmitted in order.
//! - Exactly one retransmission timer exists, armed iff the window is
//!   non-empty. The window owns the timer state; scheduling its expiry
//!   and submitting frames to the channel are the engine's job.

use crate::timer::RetransmitTimer;
use crate::SeqNo;

/// Per-frame bookkeeping, created on the frame's first transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord {
    /// Sequence number this record tracks
    pub seq: SeqNo,

    /// Transmission attempts so far (1 on first transmission)
    pub transmit_count: u32,

    /// Whether any attempt physically reached the receiver
    pub delivered: bool,

    /// Whether a cumulative ACK has covered this frame
    pub acked: bool,
}

/// Outcome of feeding an ACK to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The window slid forward
    Applied {
        /// New value of `base` (`ack + 1`)
        new_base: SeqNo,

        /// Whether every frame in the run is now acknowledged
        completed: bool,
    },

    /// ACK below `base`: duplicate or reordered, ignored
    Stale,
}

/// Sender-side protocol state for one run.
#[derive(Debug)]
pub struct SenderWindow {
    base: SeqNo,
    next_seq: SeqNo,
    window_size: u32,
    frame_count: u32,
    records: Vec<FrameRecord>,
    timer: RetransmitTimer,
}

impl SenderWindow {
    /// Create an empty window for a run of `frame_count` frames.
    ///
    /// Parameter validation happens at the config level; the window
    /// assumes `frame_count >= 1` and `window_size >= 1`.
    pub fn new(frame_count: u32, window_size: u32) -> Self {
        Self {
            base: 0,
            next_seq: 0,
            window_size,
            frame_count,
            records: Vec::with_capacity(frame_count as usize),
            timer: RetransmitTimer::new(),
        }
    }

    /// Oldest outstanding sequence number.
    pub fn base(&self) -> SeqNo {
        self.base
    }

    /// Next sequence number to be transmitted for the first time.
    pub fn next_seq(&self) -> SeqNo {
        self.next_seq
    }

    /// Number of outstanding (sent, unacknowledged) frames.
    pub fn in_flight(&self) -> u32 {
        self.next_seq - self.base
    }

    /// Whether nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.base == self.next_seq
    }

    /// Whether every frame in the run has been acknowledged.
    pub fn is_complete(&self) -> bool {
        self.base >= self.frame_count
    }

    /// Whether a new frame could be admitted right now.
    ///
    /// Compares the in-flight count against `window_size` rather than
    /// computing `base + window_size`, which can exceed `u32::MAX` for
    /// large configured windows.
    pub fn can_admit(&self) -> bool {
        self.in_flight() < self.window_size && self.next_seq < self.frame_count
    }

    /// Admit every currently admissible frame.
    ///
    /// # Returns
    /// The sequence numbers to transmit, in order. Empty when the window
    /// is full or the sequence space is exhausted.
    pub fn pump(&mut self) -> Vec<SeqNo> {
        let mut admitted = Vec::new();
        while self.can_admit() {
            admitted.push(self.admit_next());
        }
        self.check_invariants();
        admitted
    }

    /// Admit at most one frame (single iteration of `pump`).
    pub fn step_one(&mut self) -> Option<SeqNo> {
        if !self.can_admit() {
            return None;
        }
        let seq = self.admit_next();
        self.check_invariants();
        Some(seq)
    }

    /// Apply a cumulative ACK.
    ///
    /// ACKs are only generated for frames the receiver saw, so a live run
    /// never produces `ack >= next_seq`.
    pub fn on_ack(&mut self, ack: SeqNo) -> AckOutcome {
        if ack < self.base {
            return AckOutcome::Stale;
        }
        debug_assert!(ack < self.next_seq, "ack {ack} beyond transmitted range");

        let new_base = (ack + 1).min(self.next_seq);
        for seq in self.base..new_base {
            self.records[seq as usize].acked = true;
        }
        self.base = new_base;
        self.check_invariants();

        AckOutcome::Applied {
            new_base,
            completed: self.is_complete(),
        }
    }

    /// Handle timer expiry: retransmit the whole outstanding range.
    ///
    /// # Returns
    /// The sequence numbers to retransmit, in ascending order; their
    /// `transmit_count`s have been incremented. Empty if the window is
    /// empty (a stale expiry, nothing to do).
    pub fn on_timer_expired(&mut self) -> Vec<SeqNo> {
        if self.is_empty() {
            return Vec::new();
        }

        let batch: Vec<SeqNo> = (self.base..self.next_seq).collect();
        for &seq in &batch {
            self.records[seq as usize].transmit_count += 1;
        }
        self.check_invariants();
        batch
    }

    /// Record that an attempt for `seq` physically reached the receiver.
    pub fn mark_delivered(&mut self, seq: SeqNo) {
        self.records[seq as usize].delivered = true;
    }

    /// Current attempt number for a transmitted frame.
    pub fn attempt_of(&self, seq: SeqNo) -> u32 {
        self.records[seq as usize].transmit_count
    }

    /// Per-frame records for the frames transmitted so far.
    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    /// Retransmission timer owned by this window.
    pub fn timer(&self) -> &RetransmitTimer {
        &self.timer
    }

    /// Mutable timer access, used by the engine to arm and disarm.
    pub fn timer_mut(&mut self) -> &mut RetransmitTimer {
        &mut self.timer
    }

    /// Create the record for `next_seq` and advance it.
    fn admit_next(&mut self) -> SeqNo {
        let seq = self.next_seq;
        self.records.push(FrameRecord {
            seq,
            transmit_count: 1,
            delivered: false,
            acked: false,
        });
        self.next_seq += 1;
        seq
    }

    fn check_invariants(&self) {
        debug_assert!(self.base <= self.next_seq);
        debug_assert!(self.next_seq <= self.frame_count);
        debug_assert!(self.next_seq - self.base <= self.window_size);
        debug_assert_eq!(self.records.len(), self.next_seq as usize);
    }
}
