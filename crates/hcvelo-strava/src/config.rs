//! Strava client configuration.

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::error::{StravaError, StravaResult};

/// Default upstream for both the OAuth and the API endpoints.
pub const DEFAULT_API_BASE: &str = "https://www.strava.com";

/// Minimum remaining validity before a token is refreshed.
pub const DEFAULT_LOOKAHEAD_MINUTES: i64 = 10;

/// How far into the past an occurrence may be and still count as upcoming.
pub const DEFAULT_WINDOW_HOURS: i64 = 4;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth application credentials registered with Strava.
#[derive(Clone)]
pub struct OAuthCredentials {
    /// The application's client id.
    pub client_id: String,
    /// The application's client secret.
    pub client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Checks that both values are present.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.trim().is_empty() {
            return Err("client_id is required");
        }
        if self.client_secret.trim().is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Everything the token refresher and the event retriever need.
///
/// Built once by the caller and passed by reference into both components.
#[derive(Debug, Clone)]
pub struct StravaConfig {
    /// OAuth application credentials.
    pub credentials: OAuthCredentials,

    /// The club whose events are listed.
    pub club_id: String,

    /// Upstream base URL. Only changed in tests.
    pub api_base_url: Url,

    /// Request timeout for both endpoints.
    pub timeout: Duration,

    /// Tokens expiring within this span are refreshed.
    pub lookahead: chrono::Duration,

    /// Occurrences after `now - window` count as upcoming.
    pub window: chrono::Duration,

    /// Event ids that are never listed (seasonal events out of season).
    pub excluded_event_ids: HashSet<u64>,
}

impl StravaConfig {
    /// Creates a configuration with default endpoints and windows.
    pub fn new(credentials: OAuthCredentials, club_id: impl Into<String>) -> Self {
        Self {
            credentials,
            club_id: club_id.into(),
            api_base_url: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            timeout: DEFAULT_TIMEOUT,
            lookahead: chrono::Duration::minutes(DEFAULT_LOOKAHEAD_MINUTES),
            window: chrono::Duration::hours(DEFAULT_WINDOW_HOURS),
            excluded_event_ids: HashSet::new(),
        }
    }

    /// Sets the upstream base URL.
    pub fn with_api_base_url(mut self, base: &str) -> StravaResult<Self> {
        self.api_base_url = Url::parse(base).map_err(|e| {
            StravaError::configuration(format!("invalid api_base_url {:?}: {}", base, e))
        })?;
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_lookahead(mut self, lookahead: chrono::Duration) -> Self {
        self.lookahead = lookahead;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: chrono::Duration) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_excluded_event_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.excluded_event_ids = ids.into_iter().collect();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials.validate().map_err(str::to_string)?;
        if self.club_id.trim().is_empty() {
            return Err("club_id is required".to_string());
        }
        if self.lookahead < chrono::Duration::zero() {
            return Err("lookahead must not be negative".to_string());
        }
        if self.window < chrono::Duration::zero() {
            return Err("window must not be negative".to_string());
        }
        Ok(())
    }

    /// Resolves an API path against the base URL.
    pub fn endpoint(&self, path: &str) -> StravaResult<Url> {
        let mut base = self.api_base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/')).map_err(|e| {
            StravaError::configuration(format!("invalid endpoint path {:?}: {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StravaConfig {
        StravaConfig::new(OAuthCredentials::new("12345", "secret"), "678")
    }

    #[test]
    fn defaults() {
        let config = config();
        assert_eq!(config.api_base_url.as_str(), "https://www.strava.com/");
        assert_eq!(config.lookahead, chrono::Duration::minutes(10));
        assert_eq!(config.window, chrono::Duration::hours(4));
        assert!(config.excluded_event_ids.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_joins_paths() {
        let config = config();
        assert_eq!(
            config.endpoint("/api/v3/oauth/token").unwrap().as_str(),
            "https://www.strava.com/api/v3/oauth/token"
        );

        let config = config.with_api_base_url("http://127.0.0.1:9000/proxy").unwrap();
        assert_eq!(
            config.endpoint("api/v3/clubs/1/group_events").unwrap().as_str(),
            "http://127.0.0.1:9000/proxy/api/v3/clubs/1/group_events"
        );
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let err = config().with_api_base_url("not a url").unwrap_err();
        assert_eq!(err.code(), crate::StravaErrorCode::Configuration);
    }

    #[test]
    fn validate_requires_fields() {
        let missing_secret = StravaConfig::new(OAuthCredentials::new("1", ""), "2");
        assert_eq!(missing_secret.validate().unwrap_err(), "client_secret is required");

        let missing_club = StravaConfig::new(OAuthCredentials::new("1", "s"), " ");
        assert_eq!(missing_club.validate().unwrap_err(), "club_id is required");
    }

    #[test]
    fn excluded_ids_are_collected() {
        let config = config().with_excluded_event_ids([1611651, 1611651, 7]);
        assert_eq!(config.excluded_event_ids.len(), 2);
        assert!(config.excluded_event_ids.contains(&1611651));
    }

    #[test]
    fn debug_redacts_secret() {
        let dbg = format!("{:?}", OAuthCredentials::new("id", "hunter2"));
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
