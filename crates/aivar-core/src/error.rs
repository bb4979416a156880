//! Error types for the AIVAR site.

use std::path::PathBuf;
use thiserror::Error;

/// Why an input did not move the row navigation.
///
/// None of these are failures: they are dropped silently and only reported
/// so callers can observe what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Gesture magnitude below the scroll threshold.
    #[error("gesture below threshold")]
    BelowThreshold,

    /// Gesture arrived before the cooldown elapsed.
    #[error("gesture during cooldown")]
    CoolingDown,

    /// Advance at the last row or retreat at the first.
    #[error("intent out of bounds")]
    OutOfBounds,

    /// A transition is still animating.
    #[error("transition in progress")]
    TransitionInProgress,

    /// Touch end without a recorded touch start.
    #[error("no active touch")]
    NoActiveTouch,
}

/// Presenter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PresenterError {
    /// A transition was requested while another is in flight.
    #[error("presenter busy: transition to row {target} in flight")]
    Busy { target: usize },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// Parse error.
    #[error("Parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A value failed validation.
    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Errors from external session collaborators (SSO, voice agent, 3D scene).
///
/// These are caught at their own boundary and shown as inline fallback
/// content; they never reach the navigation core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Identity provider failure.
    #[error("{0}")]
    Auth(String),

    /// Voice agent failure.
    #[error("{0}")]
    Voice(String),

    /// Voice agent id is not configured.
    #[error("Voice agent ID not configured")]
    MissingAgentId,

    /// Microphone permission denied or unavailable.
    #[error("Microphone unavailable: {0}")]
    Microphone(String),

    /// 3D scene failed to load.
    #[error("Scene error: {0}")]
    Scene(String),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    Channel(String),
}
