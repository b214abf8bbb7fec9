//! Client error types.

use hcvelo_core::{FormatError, LogError};
use hcvelo_strava::StravaError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token refresh, event fetch or credential persistence failed.
    #[error("strava: {0}")]
    Strava(#[from] StravaError),

    /// Rendering events failed.
    #[error("output error: {0}")]
    Format(#[from] FormatError),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing output failed.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Logging could not be set up.
    #[error("logging setup failed: {0}")]
    Logging(#[from] LogError),
}
