//! OAuth credential storage and freshness.
//!
//! The credential triple (access token, refresh token, expiry) is the only
//! state kept between runs. [`ensure_fresh_token`] decides whether it can be
//! used as-is or must be exchanged for a new one first; [`CredentialStore`]
//! loads and saves it.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StravaError, StravaResult};

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The persisted OAuth credential record.
///
/// `expires_at` always describes `access_token`; both are replaced together
/// on refresh, along with `refresh_token` which Strava may rotate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token for API reads.
    pub access_token: String,
    /// Token used to mint a new access token.
    pub refresh_token: String,
    /// Expiry of `access_token`, in Unix seconds.
    pub expires_at: i64,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// Returns how many seconds the access token remains valid after `now`.
    ///
    /// Negative once expired. Saturates instead of overflowing.
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> i64 {
        self.expires_at.saturating_sub(now.timestamp())
    }

    /// Returns true unless the token outlives `now` by more than `lookahead`.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, lookahead: Duration) -> bool {
        self.remaining_secs_at(now) <= lookahead.num_seconds()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Exchanges a refresh token for a new credential record.
pub trait TokenRefresher: Send + Sync {
    /// Performs one refresh exchange. Implementations must not retry.
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, StravaResult<Credential>>;
}

/// Returns a credential valid for more than `lookahead` from now.
///
/// See [`ensure_fresh_token_at`].
pub async fn ensure_fresh_token(
    stored: Credential,
    refresher: &dyn TokenRefresher,
    lookahead: Duration,
) -> StravaResult<Credential> {
    ensure_fresh_token_at(stored, refresher, lookahead, Utc::now()).await
}

/// Returns a credential valid for more than `lookahead` after `now`.
///
/// If `stored` already is, it is returned unchanged and no request is made.
/// Otherwise exactly one refresh exchange is performed and its result is
/// returned as a whole. Persisting the result is left to the caller.
pub async fn ensure_fresh_token_at(
    stored: Credential,
    refresher: &dyn TokenRefresher,
    lookahead: Duration,
    now: DateTime<Utc>,
) -> StravaResult<Credential> {
    if !stored.needs_refresh_at(now, lookahead) {
        debug!(
            remaining_secs = stored.remaining_secs_at(now),
            "stored strava token is still fresh"
        );
        return Ok(stored);
    }

    info!(
        expires_at = stored.expires_at,
        "refreshing strava tokens"
    );
    let refreshed = refresher.refresh(&stored.refresh_token).await?;
    debug!(expires_at = refreshed.expires_at, "received new strava tokens");
    Ok(refreshed)
}

/// Load/save interface for the persisted credential record.
pub trait CredentialStore {
    fn load(&self) -> StravaResult<Credential>;
    fn save(&self, credential: &Credential) -> StravaResult<()>;
}

/// Stores the credential record as a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> StravaResult<Credential> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            StravaError::persistence(format!(
                "failed to read tokens file {}: {}",
                self.path.display(),
                e
            ))
            .with_source(e)
        })?;

        let credential: Credential = serde_json::from_str(&content).map_err(|e| {
            StravaError::persistence(format!(
                "failed to parse tokens file {}: {}",
                self.path.display(),
                e
            ))
            .with_source(e)
        })?;

        debug!("loaded tokens from {:?}", self.path);
        Ok(credential)
    }

    /// Writes the record to a temporary file and renames it into place, so a
    /// failed write never leaves a truncated record behind.
    fn save(&self, credential: &Credential) -> StravaResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StravaError::persistence(format!("failed to create token directory: {}", e))
                    .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(credential).map_err(|e| {
            StravaError::persistence(format!("failed to serialize tokens: {}", e)).with_source(e)
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            StravaError::persistence(format!("failed to write tokens file: {}", e)).with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)) {
                warn!(path = %temp_path.display(), error = %e, "could not restrict token file permissions");
            }
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            StravaError::persistence(format!("failed to replace tokens file: {}", e))
                .with_source(e)
        })?;

        debug!("saved tokens to {:?}", self.path);
        Ok(())
    }
}
