//! Discrete-event Go-Back-N engine.
//!
//! [`Engine`] wires the sender window, receiver, and the two channel
//! directions together around a single event queue keyed by simulated
//! time. Nothing inside blocks or consults the wall clock: every future
//! effect (a frame arriving, an ACK arriving, the retransmission timer
//! expiring) is an entry in the queue, and the clock jumps from one due
//! time to the next.
//!
//! # Driving a run
//!
//! Three styles, freely mixable:
//! - [`Engine::run_to_completion`] processes events until every frame
//!   is acknowledged.
//! - [`Engine::advance_by`] processes everything due inside a bounded
//!   window of simulated time, for animation at a fixed cadence.
//! - [`Engine::step`] performs one protocol action at a time while
//!   paused.
//!
//! Observable actions are queued as [`EngineEvent`]s with their
//! emission times; call [`Engine::drain_events`] to collect them.
//!
//! # Determinism
//!
//! Entries due at the same instant dispatch in submission order, and
//! each channel direction owns a seeded RNG stream, so two engines
//! built from the same [`SimConfig`] produce identical traces.

use crate::channel::Channel;
use crate::config::SimConfig;
use crate::error::{Error, Result, TransitionError};
use crate::event::EngineEvent;
use crate::policy::{DelayPolicy, LossPolicy};
use crate::receiver::Receiver;
use crate::sender::{AckOutcome, FrameRecord, SenderWindow};
use crate::stats::RunStats;
use crate::timer::TimerGeneration;
use crate::{SeqNo, SimTime};
use log::debug;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

/// Distinguishes the ACK channel's RNG stream from the frame channel's
/// when both derive from the same master seed.
const ACK_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Configured but not started
    Idle,
    /// Clock advances and events dispatch
    Running,
    /// Clock frozen; scheduled events preserved
    Paused,
    /// Every frame acknowledged; final statistics available
    Completed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Paused => "paused",
            EngineState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A future effect waiting in the event queue.
#[derive(Debug, Clone, Copy)]
enum ScheduledKind {
    /// A frame attempt reaches the receiver
    FrameArrival { seq: SeqNo, attempt: u32 },

    /// A dropped frame attempt reaches its would-be arrival time
    FrameDrop { seq: SeqNo, attempt: u32 },

    /// An ACK reaches the sender
    AckArrival { ack: SeqNo },

    /// A dropped ACK reaches its would-be arrival time
    AckDrop { ack: SeqNo },

    /// The retransmission timer for `generation` expires
    TimerExpiry { generation: TimerGeneration },
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: SimTime,
    id: u64,
    kind: ScheduledKind,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for Scheduled {}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the earliest entry first; the
        // submission id breaks ties in FIFO order.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Point-in-time view of a run, cheap to copy out for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub state: EngineState,
    /// Simulated clock in milliseconds
    pub now: SimTime,
    /// Oldest outstanding sequence number
    pub base: SeqNo,
    /// Next sequence number to transmit for the first time
    pub next_seq: SeqNo,
    /// Sequence number the receiver will accept next
    pub expected: SeqNo,
    pub timer_armed: bool,
    pub stats: RunStats,
}

/// Deterministic Go-Back-N simulation instance.
#[derive(Debug)]
pub struct Engine {
    config: SimConfig,
    state: EngineState,
    now: SimTime,
    queue: BinaryHeap<Scheduled>,
    next_entry_id: u64,
    sender: SenderWindow,
    receiver: Receiver,
    frame_channel: Channel,
    ack_channel: Channel,
    stats: RunStats,
    outbox: VecDeque<(SimTime, EngineEvent)>,
}

impl Engine {
    /// Build an engine for `config`, validating it first.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Assemble fresh components for a validated configuration.
    fn build(config: SimConfig) -> Self {
        let sender = SenderWindow::new(config.frame_count, config.window_size);
        let frame_channel = Channel::new(
            config.frame_transit_ms,
            config.frame_loss.clone(),
            config.frame_delay.clone(),
            config.seed,
        );
        // The receiver turnaround and the fixed ACK delay both land on
        // every ACK, so they fold into the reverse channel's base transit.
        let ack_channel = Channel::new(
            config.process_ms + config.ack_transit_ms + config.ack_delay_ms,
            LossPolicy::Random {
                probability: config.ack_loss,
            },
            DelayPolicy::None,
            config.seed ^ ACK_STREAM_SALT,
        );
        let stats = RunStats::new(config.frame_count);

        Self {
            config,
            state: EngineState::Idle,
            now: 0,
            queue: BinaryHeap::new(),
            next_entry_id: 0,
            sender,
            receiver: Receiver::new(),
            frame_channel,
            ack_channel,
            stats,
            outbox: VecDeque::new(),
        }
    }

    // === Lifecycle ===

    /// Begin the run: fill the window and start the clock.
    pub fn start(&mut self) -> Result<()> {
        if self.state != EngineState::Idle {
            return Err(self.bad_transition("start"));
        }
        self.state = EngineState::Running;
        debug!(
            "[engine] start: {} frames, window {}, timeout {} ms",
            self.config.frame_count, self.config.window_size, self.config.timeout_ms
        );

        for seq in self.sender.pump() {
            self.transmit_frame(seq);
        }
        if !self.sender.is_empty() {
            self.arm_timer();
        }
        Ok(())
    }

    /// Freeze the clock. Scheduled events stay queued.
    pub fn pause(&mut self) -> Result<()> {
        if self.state != EngineState::Running {
            return Err(self.bad_transition("pause"));
        }
        self.state = EngineState::Paused;
        debug!("[engine] paused at {} ms", self.now);
        Ok(())
    }

    /// Continue a paused run.
    pub fn resume(&mut self) -> Result<()> {
        if self.state != EngineState::Paused {
            return Err(self.bad_transition("resume"));
        }
        self.state = EngineState::Running;
        debug!("[engine] resumed at {} ms", self.now);
        Ok(())
    }

    /// Abandon the current run and return to `Idle` with the same
    /// configuration. Legal from any state; scheduled events are
    /// discarded.
    pub fn reset(&mut self) {
        debug!("[engine] reset");
        *self = Self::build(self.config.clone());
    }

    /// Replace the configuration. Only legal when no run is in progress
    /// (`Idle` or `Completed`); resets all components.
    pub fn configure(&mut self, config: SimConfig) -> Result<()> {
        match self.state {
            EngineState::Idle | EngineState::Completed => {}
            _ => return Err(self.bad_transition("configure")),
        }
        config.validate()?;
        *self = Self::build(config);
        Ok(())
    }

    /// Perform exactly one protocol action while paused.
    ///
    /// From `Idle` this enters `Paused` first, so a run can be walked
    /// from its very first transmission. A step admits one new frame if
    /// the window allows it; otherwise it dispatches the next scheduled
    /// event, so manual runs always make progress.
    pub fn step(&mut self) -> Result<()> {
        match self.state {
            EngineState::Idle => self.state = EngineState::Paused,
            EngineState::Paused => {}
            _ => return Err(self.bad_transition("step")),
        }

        if let Some(seq) = self.sender.step_one() {
            self.transmit_frame(seq);
            if !self.sender.timer().is_armed() {
                self.arm_timer();
            }
        } else if let Some(entry) = self.queue.pop() {
            self.now = entry.due;
            self.dispatch(entry.kind);
        }
        Ok(())
    }

    fn bad_transition(&self, action: &'static str) -> Error {
        TransitionError {
            action,
            state: self.state,
        }
        .into()
    }

    // === Driving ===

    /// Process every event due within the next `delta_ms` of simulated
    /// time and advance the clock to the end of that window.
    ///
    /// Does nothing unless the engine is `Running`.
    ///
    /// # Returns
    /// The number of events dispatched.
    pub fn advance_by(&mut self, delta_ms: u64) -> usize {
        if self.state != EngineState::Running {
            return 0;
        }
        let target = self.now + delta_ms;
        let mut processed = 0;

        while self.state == EngineState::Running {
            if !matches!(self.queue.peek(), Some(entry) if entry.due <= target) {
                break;
            }
            if let Some(entry) = self.queue.pop() {
                self.now = entry.due;
                self.dispatch(entry.kind);
                processed += 1;
            }
        }
        if self.state == EngineState::Running {
            self.now = target;
        }
        processed
    }

    /// Jump the clock to the next scheduled event and dispatch it.
    ///
    /// # Returns
    /// `false` when the engine is not `Running` or nothing is queued.
    pub fn process_next(&mut self) -> bool {
        if self.state != EngineState::Running {
            return false;
        }
        match self.queue.pop() {
            Some(entry) => {
                self.now = entry.due;
                self.dispatch(entry.kind);
                true
            }
            None => false,
        }
    }

    /// Drive the run until every frame is acknowledged.
    ///
    /// Starts or resumes as needed. Under a policy that drops every
    /// attempt forever (for example `Random { probability: 1.0 }` on
    /// the frame path) the run cannot complete and this never returns;
    /// callers wanting a bound should drive [`Engine::process_next`]
    /// themselves.
    pub fn run_to_completion(&mut self) -> Result<()> {
        match self.state {
            EngineState::Idle => self.start()?,
            EngineState::Paused => self.resume()?,
            EngineState::Running | EngineState::Completed => {}
        }
        while self.process_next() {}
        Ok(())
    }

    // === Observation ===

    /// Copy out the current protocol state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            now: self.now,
            base: self.sender.base(),
            next_seq: self.sender.next_seq(),
            expected: self.receiver.expected(),
            timer_armed: self.sender.timer().is_armed(),
            stats: self.stats,
        }
    }

    /// Take all events emitted since the last drain, oldest first, each
    /// paired with its simulated emission time.
    pub fn drain_events(&mut self) -> Vec<(SimTime, EngineEvent)> {
        self.outbox.drain(..).collect()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Simulated clock in milliseconds.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Statistics accumulated so far; final totals once `Completed`.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Configuration the current run was built from.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Per-frame transmission records, indexed by sequence number.
    pub fn frame_records(&self) -> &[FrameRecord] {
        self.sender.records()
    }

    // === Event processing ===

    fn schedule(&mut self, due: SimTime, kind: ScheduledKind) {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        self.queue.push(Scheduled { due, id, kind });
    }

    fn emit(&mut self, event: EngineEvent) {
        self.outbox.push_back((self.now, event));
    }

    /// Submit one attempt for `seq` to the frame channel.
    ///
    /// The channel's verdict is frozen here: the loss decision and the
    /// arrival time are fixed at submission, and the outcome is queued
    /// for that instant.
    fn transmit_frame(&mut self, seq: SeqNo) {
        let attempt = self.sender.attempt_of(seq);
        self.stats.total_transmissions += 1;
        self.emit(EngineEvent::FrameSent { seq, attempt });

        let transit = self.frame_channel.transmit(seq, attempt, self.now);
        if transit.dropped {
            debug!(
                "[chan] frame {seq} attempt {attempt} will drop at {} ms",
                transit.arrival
            );
            self.schedule(transit.arrival, ScheduledKind::FrameDrop { seq, attempt });
        } else {
            debug!(
                "[chan] frame {seq} attempt {attempt} arrives at {} ms",
                transit.arrival
            );
            self.schedule(transit.arrival, ScheduledKind::FrameArrival { seq, attempt });
        }
    }

    /// Submit a cumulative ACK to the reverse channel.
    fn transmit_ack(&mut self, ack: SeqNo) {
        self.stats.total_acks += 1;
        self.emit(EngineEvent::AckSent { ack });

        let transit = self.ack_channel.transmit(ack, 1, self.now);
        if transit.dropped {
            debug!("[chan] ack {ack} will drop at {} ms", transit.arrival);
            self.schedule(transit.arrival, ScheduledKind::AckDrop { ack });
        } else {
            debug!("[chan] ack {ack} arrives at {} ms", transit.arrival);
            self.schedule(transit.arrival, ScheduledKind::AckArrival { ack });
        }
    }

    /// Arm (or restart) the retransmission timer from the current
    /// instant. Any previously scheduled expiry becomes stale.
    fn arm_timer(&mut self) {
        let generation = self.sender.timer_mut().arm();
        let due = self.now + self.config.timeout_ms;
        self.schedule(due, ScheduledKind::TimerExpiry { generation });
        debug!("[timer] armed generation {generation}, expires at {due} ms");
    }

    fn dispatch(&mut self, kind: ScheduledKind) {
        match kind {
            ScheduledKind::FrameArrival { seq, attempt } => self.on_frame_arrival(seq, attempt),
            ScheduledKind::FrameDrop { seq, attempt } => {
                self.stats.frames_lost += 1;
                self.emit(EngineEvent::FrameLost { seq, attempt });
            }
            ScheduledKind::AckArrival { ack } => self.on_ack_arrival(ack),
            ScheduledKind::AckDrop { ack } => {
                self.stats.acks_lost += 1;
                self.emit(EngineEvent::AckLost { ack });
            }
            ScheduledKind::TimerExpiry { generation } => self.on_timer_expiry(generation),
        }
    }

    fn on_frame_arrival(&mut self, seq: SeqNo, attempt: u32) {
        debug!("[engine] frame {seq} attempt {attempt} arrived at {} ms", self.now);
        self.sender.mark_delivered(seq);

        let decision = self.receiver.on_frame(seq);
        if decision.accepted {
            self.stats.frames_delivered += 1;
            self.emit(EngineEvent::FrameDelivered { seq });
        } else {
            self.emit(EngineEvent::FrameDiscarded {
                seq,
                expected: self.receiver.expected(),
            });
        }
        // Out-of-order arrivals repeat the last cumulative ACK; before
        // the first in-order delivery there is nothing to acknowledge.
        if let Some(ack) = decision.ack {
            self.transmit_ack(ack);
        }
    }

    fn on_ack_arrival(&mut self, ack: SeqNo) {
        match self.sender.on_ack(ack) {
            AckOutcome::Applied {
                new_base,
                completed,
            } => {
                self.emit(EngineEvent::AckApplied { ack, new_base });
                for seq in self.sender.pump() {
                    self.transmit_frame(seq);
                }
                if completed {
                    self.complete_run();
                } else {
                    self.arm_timer();
                }
            }
            AckOutcome::Stale => {
                debug!(
                    "[engine] stale ack {ack} ignored (window base {})",
                    self.sender.base()
                );
            }
        }
    }

    fn on_timer_expiry(&mut self, generation: TimerGeneration) {
        if !self.sender.timer().is_live(generation) {
            debug!("[timer] expiry for stale generation {generation} ignored");
            return;
        }

        let batch = self.sender.on_timer_expired();
        if batch.is_empty() {
            self.sender.timer_mut().disarm();
            return;
        }

        let base = self.sender.base();
        let end = self.sender.next_seq();
        debug!("[timer] expired at {} ms, retransmitting {base}..{end}", self.now);
        self.emit(EngineEvent::Timeout {
            base,
            retransmitted: base..end,
        });
        for seq in batch {
            self.transmit_frame(seq);
        }
        self.arm_timer();
    }

    /// Settle the run once every frame is acknowledged.
    ///
    /// Clears the event queue, so channel verdicts still pending at this
    /// instant (in-flight arrivals, drop observations, the armed timer's
    /// expiry) are cancelled unobserved. The loss counters therefore
    /// cover only drops whose would-be arrival fell before completion.
    fn complete_run(&mut self) {
        self.sender.timer_mut().disarm();
        self.queue.clear();
        self.state = EngineState::Completed;
        self.stats.finished_ms = Some(self.now);
        debug!("[engine] completed at {} ms", self.now);
        self.emit(EngineEvent::Completed { stats: self.stats });
    }
}
