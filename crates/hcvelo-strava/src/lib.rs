//! Strava OAuth token lifecycle and club event retrieval.
//!
//! - [`ensure_fresh_token`] - Refreshes the stored credential when it is about to expire
//! - [`FileCredentialStore`] - JSON persistence of the credential record
//! - [`EventRetriever`] - Fetches, filters and deduplicates a club's upcoming events
//! - [`StravaError`] - Error type for all of the above
//!
//! # Flow
//!
//! ```text
//!  stravaTokens.json ──load──► Credential ──ensure_fresh_token──► Credential
//!                                                 │ (POST /oauth/token when stale)
//!                                                 ▼
//!                                    EventRetriever::fetch(access_token)
//!                                                 │ (GET /clubs/{id}/group_events)
//!                                                 ▼
//!                                             EventSet
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hcvelo_strava::{
//!     CredentialStore, EventRetriever, FileCredentialStore, OAuthClient, OAuthCredentials,
//!     StravaConfig, ensure_fresh_token,
//! };
//!
//! let config = StravaConfig::new(OAuthCredentials::new(id, secret), club_id);
//! let store = FileCredentialStore::new(token_path);
//!
//! let credential = ensure_fresh_token(store.load()?, &OAuthClient::new(&config)?, config.lookahead).await?;
//! let events = EventRetriever::new(config)?.fetch(&credential.access_token).await?;
//! store.save(&credential)?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod oauth;
pub mod tokens;

pub use client::StravaClient;
pub use config::{OAuthCredentials, StravaConfig};
pub use error::{StravaError, StravaErrorCode, StravaResult};
pub use events::{EventRetriever, select_upcoming};
pub use oauth::OAuthClient;
pub use tokens::{
    BoxFuture, Credential, CredentialStore, FileCredentialStore, TokenRefresher,
    ensure_fresh_token, ensure_fresh_token_at,
};
