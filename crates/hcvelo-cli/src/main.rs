//! hcvelo CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use hcvelo_core::{LogConfig, init_logging};

use hcvelo_cli::cli::{Cli, Command, ConfigAction, StravaAction};
use hcvelo_cli::config::AppConfig;
use hcvelo_cli::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path).map_err(ClientError::Config)?,
        None => AppConfig::load().map_err(ClientError::Config)?,
    };

    let log_config = if cli.debug || config.debug {
        LogConfig::verbose()
    } else {
        LogConfig::quiet()
    };
    init_logging(&log_config.with_format(config.logging.format))?;

    let overrides = cli.command.strava_overrides();
    match cli.command {
        Command::Strava { action, .. } => match action {
            StravaAction::Events { format, output } => {
                hcvelo_cli::commands::strava::events(
                    &config,
                    &overrides,
                    format.into(),
                    output.as_deref(),
                )
                .await
            }
            StravaAction::Tokens => hcvelo_cli::commands::strava::tokens(&config),
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => hcvelo_cli::commands::config::dump(&config),
            ConfigAction::Validate => {
                hcvelo_cli::commands::config::validate(&config, &overrides)
            }
            ConfigAction::Path => hcvelo_cli::commands::config::path(&config),
        },
    }
}
