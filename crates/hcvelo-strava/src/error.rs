//! Error types for Strava operations.
//!
//! Every failure in this crate is a [`StravaError`] tagged with a
//! [`StravaErrorCode`]. Nothing here is retried: callers receive the error as
//! soon as it happens and decide what to do with it.

use std::fmt;

use hcvelo_core::OccurrenceParseError;
use thiserror::Error;

/// The category of a Strava error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StravaErrorCode {
    /// Connection, DNS, TLS or timeout failure while calling upstream.
    Transport,
    /// Upstream answered with a status other than 200.
    UpstreamStatus,
    /// Malformed JSON body or unparseable timestamp.
    Decode,
    /// Stored credentials could not be read or written.
    Persistence,
    /// Missing or invalid settings.
    Configuration,
}

impl StravaErrorCode {
    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport_error",
            Self::UpstreamStatus => "upstream_status",
            Self::Decode => "decode_error",
            Self::Persistence => "persistence_error",
            Self::Configuration => "configuration_error",
        }
    }
}

impl fmt::Display for StravaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to Strava or handling credentials.
#[derive(Debug, Error)]
pub struct StravaError {
    code: StravaErrorCode,
    message: String,
    /// HTTP status for `UpstreamStatus` errors.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StravaError {
    pub fn new(code: StravaErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(StravaErrorCode::Transport, message)
    }

    /// Creates an error for a non-200 upstream response.
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(StravaErrorCode::UpstreamStatus, message);
        err.status = Some(status);
        err
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(StravaErrorCode::Decode, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(StravaErrorCode::Persistence, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(StravaErrorCode::Configuration, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> StravaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the upstream HTTP status, if this is a status error.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl fmt::Display for StravaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<OccurrenceParseError> for StravaError {
    fn from(err: OccurrenceParseError) -> Self {
        Self::decode(format!("failed to parse event date: {}", err)).with_source(err)
    }
}

/// Maps a reqwest send/read failure to a transport error.
pub(crate) fn transport_error(context: &str, err: reqwest::Error) -> StravaError {
    let message = if err.is_timeout() {
        format!("{}: request timeout", context)
    } else if err.is_connect() {
        format!("{}: connection failed: {}", context, err)
    } else {
        format!("{}: {}", context, err)
    };
    StravaError::transport(message).with_source(err)
}

/// A specialized Result type for Strava operations.
pub type StravaResult<T> = Result<T, StravaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_names() {
        assert_eq!(StravaErrorCode::Transport.as_str(), "transport_error");
        assert_eq!(StravaErrorCode::UpstreamStatus.as_str(), "upstream_status");
        assert_eq!(StravaErrorCode::Decode.to_string(), "decode_error");
    }

    #[test]
    fn upstream_status_keeps_code() {
        let err = StravaError::upstream_status(401, "unexpected status code: 401");
        assert_eq!(err.code(), StravaErrorCode::UpstreamStatus);
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "upstream_status: unexpected status code: 401"
        );
    }

    #[test]
    fn other_errors_have_no_status() {
        assert!(StravaError::decode("bad json").status().is_none());
        assert!(StravaError::persistence("disk full").status().is_none());
    }

    #[test]
    fn occurrence_error_becomes_decode() {
        use std::error::Error;
        let parse_err = hcvelo_core::parse_occurrence("not a date").unwrap_err();
        let err = StravaError::from(parse_err);
        assert_eq!(err.code(), StravaErrorCode::Decode);
        assert!(err.message().contains("not a date"));
        assert!(err.source().is_some());
    }
}
