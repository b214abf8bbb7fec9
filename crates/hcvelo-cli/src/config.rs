//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/hcvelo/config.toml` by default. The Strava token record lives
//! next to it in `stravaTokens.json` unless `token_path` says otherwise.
//!
//! Credential values (`client_id`, `client_secret`) support secret references:
//! - `pass::path/in/store` — resolved via `pass show`
//! - `env::VAR_NAME` — resolved from the environment
//! - plain text — used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use hcvelo_core::{FormatOptions, LogFormat};
use hcvelo_strava::{OAuthCredentials, StravaConfig};
use serde::{Deserialize, Serialize};

/// Name of the token file inside the config directory.
pub const TOKEN_FILE_NAME: &str = "stravaTokens.json";

// ---------------------------------------------------------------------------
// AppConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the hcvelo client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Debug mode.
    pub debug: bool,

    /// Strava settings.
    pub strava: StravaSettings,

    /// Output settings.
    pub output: OutputSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Directory the config was loaded from; anchors the default token path.
    #[serde(skip)]
    pub config_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self {
                config_dir: Some(Self::default_config_dir()),
                ..Self::default()
            })
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
        config.config_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hcvelo")
    }

    /// Returns where the Strava token record is stored.
    pub fn token_path(&self) -> PathBuf {
        if let Some(ref path) = self.strava.token_path {
            return path.clone();
        }
        self.config_dir
            .clone()
            .unwrap_or_else(Self::default_config_dir)
            .join(TOKEN_FILE_NAME)
    }
}

// ---------------------------------------------------------------------------
// StravaSettings
// ---------------------------------------------------------------------------

/// Strava settings from the `[strava]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StravaSettings {
    /// OAuth client id (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// OAuth client secret (supports `pass::` and `env::` prefixes).
    pub client_secret: Option<String>,

    /// Club whose events are listed.
    pub club_id: Option<String>,

    /// Path to the token record.
    pub token_path: Option<PathBuf>,

    /// Upstream base URL.
    pub api_base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Refresh tokens that expire within this many minutes.
    pub lookahead_minutes: i64,

    /// Keep events with an occurrence up to this many hours in the past.
    pub window_hours: i64,

    /// Event ids that are never listed.
    pub excluded_event_ids: Vec<u64>,
}

impl Default for StravaSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            club_id: None,
            token_path: None,
            api_base_url: None,
            timeout_secs: hcvelo_strava::config::DEFAULT_TIMEOUT.as_secs(),
            lookahead_minutes: hcvelo_strava::config::DEFAULT_LOOKAHEAD_MINUTES,
            window_hours: hcvelo_strava::config::DEFAULT_WINDOW_HOURS,
            excluded_event_ids: Vec::new(),
        }
    }
}

/// Values given on the command line, which win over `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct StravaOverrides {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub club_id: Option<String>,
}

impl StravaSettings {
    /// Returns a copy with command-line values applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &StravaOverrides) -> Self {
        let mut settings = self.clone();
        if let Some(ref id) = overrides.client_id {
            settings.client_id = Some(id.clone());
        }
        if let Some(ref secret) = overrides.client_secret {
            settings.client_secret = Some(secret.clone());
        }
        if let Some(ref club) = overrides.club_id {
            settings.club_id = Some(club.clone());
        }
        settings
    }

    /// Resolves OAuth credentials, expanding secret references.
    pub fn resolve_credentials(&self) -> Result<OAuthCredentials, String> {
        let raw_id = self.client_id.as_deref().ok_or_else(|| {
            format!(
                "Strava credentials not found. Add to {}:\n  \
                 [strava]\n  \
                 client_id = \"12345\"\n  \
                 client_secret = \"env::STRAVA_CLIENT_SECRET\"\n\n  \
                 Or pass --client-id and --client-secret",
                AppConfig::default_path().display()
            )
        })?;

        let raw_secret = self.client_secret.as_deref().ok_or_else(|| {
            "client_secret is missing from [strava] section in config.toml".to_string()
        })?;

        let client_id = crate::secret::resolve(raw_id)
            .map_err(|e| format!("failed to resolve client_id: {}", e))?;
        let client_secret = crate::secret::resolve(raw_secret)
            .map_err(|e| format!("failed to resolve client_secret: {}", e))?;

        Ok(OAuthCredentials::new(client_id, client_secret))
    }

    /// Builds the configuration shared by the refresher and the retriever.
    pub fn to_strava_config(&self) -> Result<StravaConfig, String> {
        let credentials = self.resolve_credentials()?;
        let club_id = self
            .club_id
            .clone()
            .ok_or_else(|| "club_id is missing from [strava] section in config.toml".to_string())?;

        let lookahead = chrono::Duration::try_minutes(self.lookahead_minutes).ok_or_else(|| {
            format!("lookahead_minutes is out of range: {}", self.lookahead_minutes)
        })?;
        let window = chrono::Duration::try_hours(self.window_hours)
            .ok_or_else(|| format!("window_hours is out of range: {}", self.window_hours))?;

        let mut config = StravaConfig::new(credentials, club_id)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_lookahead(lookahead)
            .with_window(window)
            .with_excluded_event_ids(self.excluded_event_ids.iter().copied());

        if let Some(ref base) = self.api_base_url {
            config = config.with_api_base_url(base).map_err(|e| e.to_string())?;
        }

        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// OutputSettings
// ---------------------------------------------------------------------------

/// Output settings from the `[output]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// IANA zone used for Markdown dates and times.
    pub timezone: String,

    /// Markdown template file; the built-in template is used when unset.
    pub template_path: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            timezone: "Europe/London".to_string(),
            template_path: None,
        }
    }
}

impl OutputSettings {
    /// Parses the configured zone.
    pub fn timezone(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Builds render options for a club, reading the template file if set.
    pub fn format_options(&self, club_id: &str) -> Result<FormatOptions, String> {
        let mut options = FormatOptions::new(club_id).with_timezone(self.timezone()?);
        if let Some(ref path) = self.template_path {
            let template = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read template {}: {}", path.display(), e))?;
            options = options.with_template(template);
        }
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// LoggingSettings
// ---------------------------------------------------------------------------

/// Logging settings from the `[logging]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `text` or `json`.
    pub format: LogFormat,
}
