//! gbn-sim-core: Deterministic Go-Back-N ARQ simulation engine
//!
//! This library provides the core components for a learning-focused
//! simulation of the Go-Back-N protocol over an unreliable link:
//! - Sender sliding window with cumulative ACKs and a single timer
//! - Receiver enforcing strictly in-order delivery
//! - Channel model injecting loss and delay (stochastic or deterministic)
//! - Discrete-event engine driving everything on a virtual clock
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `config`: simulation parameters and validation
//! - `policy`: loss and delay decision strategies
//! - `channel`: one-way unreliable link with frozen per-attempt verdicts
//! - `timer`: single restartable retransmission timer
//! - `sender`: Go-Back-N window bookkeeping
//! - `receiver`: in-order acceptance and cumulative-ACK decisions
//! - `stats`: run counters and derived ratios
//! - `event`: observable engine events
//! - `engine`: discrete-event scheduler composing the above
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Virtual time**: The engine never reads the wall clock, so runs are
//!   instant under test and pausable under interactive drivers
//! - **Deterministic**: Seeded randomness plus FIFO tie-breaking makes
//!   traces bit-identical for a given config and seed
//! - **Observable**: Every protocol action surfaces as an engine event;
//!   rendering is the consumer's problem

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod policy;
pub mod receiver;
pub mod sender;
pub mod stats;
pub mod timer;

// Re-export commonly used types
pub use config::SimConfig;
pub use engine::{Engine, EngineState, Snapshot};
pub use error::{Error, Result};
pub use event::EngineEvent;
pub use policy::{DelayPolicy, LossPolicy};
pub use stats::RunStats;

/// Sequence number of a frame, in `[0, frame_count)`. Runs are bounded, so
/// sequence numbers never wrap.
pub type SeqNo = u32;

/// A point in simulated time, in milliseconds since the start of the run.
pub type SimTime = u64;
