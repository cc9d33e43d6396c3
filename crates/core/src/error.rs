//! Error types for the simulation engine.
//!
//! All operations return structured errors rather than panicking.
//! Only two things can actually fail: configuring the engine with
//! out-of-range parameters, and calling a lifecycle operation from the
//! wrong state. Everything the channel does to a frame (drop, delay,
//! duplicate arrival) is modeled behavior, not an error.
//!
//! Stale events (an ACK below the window base, a timer expiry from a
//! superseded generation) are deliberately absent here: they are
//! idempotent no-ops inside the engine, logged at debug level at most.

use crate::engine::EngineState;
use thiserror::Error;

/// Top-level error type for all operations in the system.
#[derive(Debug, Error)]
pub enum Error {
    /// A simulation parameter was out of range
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A lifecycle operation was called from the wrong state
    #[error("invalid transition: {0}")]
    Transition(#[from] TransitionError),
}

/// Configuration validation errors.
///
/// Raised by [`crate::config::SimConfig::validate`]; the simulation is
/// never started with a rejected configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Frame count must cover at least one frame
    #[error("frame count must be at least 1, got {0}")]
    FrameCount(u32),

    /// Window must admit at least one outstanding frame
    #[error("window size must be at least 1, got {0}")]
    WindowSize(u32),

    /// Timeout must be a positive duration
    #[error("timeout must be at least 1 ms, got {0}")]
    Timeout(u64),

    /// Loss probability outside the unit interval
    #[error("loss probability must be within 0.0..=1.0, got {0}")]
    Probability(f64),

    /// Every-k policies need a positive interval
    #[error("every-k interval must be at least 1")]
    Interval,

    /// Specific policies with no entries select nothing
    #[error("specific policy needs at least one sequence number")]
    EmptySet,
}

/// Illegal lifecycle call, e.g. `start()` while already running.
///
/// Non-fatal: the engine state is unchanged and the caller may retry
/// from a legal state.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} while {state}")]
pub struct TransitionError {
    /// The operation that was attempted
    pub action: &'static str,

    /// The state the engine was in
    pub state: EngineState,
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
