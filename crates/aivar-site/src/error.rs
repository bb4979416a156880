//! Driver errors.

use thiserror::Error;

use aivar_core::ConfigError;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading the script or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A script line could not be parsed.
    #[error("Script line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}
