//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hcvelo_core::OutputFormat;

use crate::config::StravaOverrides;

/// hcvelo - Upcoming club rides from Strava
#[derive(Debug, Parser)]
#[command(name = "hcvelo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "HCVELO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Strava commands
    Strava {
        /// OAuth client ID (from the Strava API settings page)
        #[arg(long, env = "STRAVA_CLIENT_ID", global = true)]
        client_id: Option<String>,

        /// OAuth client secret
        #[arg(long, env = "STRAVA_CLIENT_SECRET", global = true, hide_env_values = true)]
        client_secret: Option<String>,

        /// Club whose events are listed
        #[arg(long, env = "STRAVA_CLUB_ID", global = true)]
        club_id: Option<String>,

        #[command(subcommand)]
        action: StravaAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Command {
    /// Returns the Strava values given on the command line.
    pub fn strava_overrides(&self) -> StravaOverrides {
        match self {
            Self::Strava {
                client_id,
                client_secret,
                club_id,
                ..
            } => StravaOverrides {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                club_id: club_id.clone(),
            },
            Self::Config { .. } => StravaOverrides::default(),
        }
    }
}

/// Strava actions.
#[derive(Debug, Subcommand)]
pub enum StravaAction {
    /// Refresh tokens if needed and list upcoming club events
    Events {
        /// Output format
        #[arg(long, short, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,

        /// Write files into this directory instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the stored token record
    Tokens,
}

/// Output format accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// A JSON array of events
    Json,
    /// One Markdown document per event
    Md,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Md => OutputFormat::Markdown,
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
