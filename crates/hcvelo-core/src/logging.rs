//! Log output setup.
//!
//! Logs always go to stderr; stdout carries the JSON or Markdown output.
//! `RUST_LOG` overrides the level chosen here.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Errors from [`init_logging`].
#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter {directives:?}: {source}")]
    Filter {
        directives: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// How log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Log settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level for hcvelo's own crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: LogFormat,
    /// Adds timestamps, targets and source locations to text output.
    pub detailed: bool,
    /// Explicit filter directives, used instead of `level` and `RUST_LOG`.
    pub directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::quiet()
    }
}

impl LogConfig {
    /// Warnings and errors only.
    pub fn quiet() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Text,
            detailed: false,
            directives: None,
        }
    }

    /// Everything down to debug, with timestamps and locations.
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            detailed: true,
            ..Self::quiet()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, LogError> {
        match self.directives {
            Some(ref directives) => {
                EnvFilter::try_new(directives).map_err(|source| LogError::Filter {
                    directives: directives.clone(),
                    source,
                })
            }
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("hcvelo={}", self.level)))),
        }
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        match self.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .boxed(),
            LogFormat::Text => {
                let layer = fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(self.detailed)
                    .with_file(self.detailed)
                    .with_line_number(self.detailed);
                if self.detailed {
                    layer.boxed()
                } else {
                    layer.without_time().boxed()
                }
            }
        }
    }
}

/// Installs the global log subscriber. Call once, early in `main`.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = config.filter()?;
    tracing_subscriber::registry()
        .with(config.layer())
        .with(filter)
        .try_init()?;
    Ok(())
}
