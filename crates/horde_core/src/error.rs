//! Error types for the simulation core.
//!
//! Frame updates never fail: they degrade (fallback weapon, guarded math,
//! clamped timers). These errors only surface from data validation, audio start-up
//! and replay decoding, where a caller can actually react to them.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the simulation core.
#[derive(Debug, Error)]
pub enum GameError {
    /// Static data failed validation.
    #[error("Invalid game data: {}", .0.join("; "))]
    InvalidData(Vec<String>),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the table or file that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// The audio backend could not start. Play continues silently.
    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    /// Replay payload could not be encoded or decoded.
    #[error("Replay serialization failed: {0}")]
    ReplaySerialization(String),

    /// Replay re-simulation produced a different final state.
    #[error("Replay desync at tick {tick}: recorded hash {recorded}, replayed hash {replayed}")]
    ReplayDesync {
        /// Tick where the comparison happened.
        tick: u64,
        /// Hash stored in the replay.
        recorded: u64,
        /// Hash produced by re-simulation.
        replayed: u64,
    },
}
