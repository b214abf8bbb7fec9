//! Strava commands.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use hcvelo_core::{EventSet, OutputFormat, OutputFormatter};
use hcvelo_strava::{
    Credential, CredentialStore, EventRetriever, FileCredentialStore, OAuthClient, StravaConfig,
    ensure_fresh_token_at,
};
use tracing::{debug, info};

use crate::config::{AppConfig, StravaOverrides};
use crate::error::{ClientError, ClientResult};

/// File name of the JSON listing inside an output directory.
pub const JSON_FILE_NAME: &str = "upcoming.json";

/// Refreshes tokens if needed, fetches upcoming events and renders them.
pub async fn events(
    config: &AppConfig,
    overrides: &StravaOverrides,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> ClientResult<()> {
    let (events, formatter) = fetch_events_at(config, overrides, Utc::now()).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_events(&formatter, format, &events, output_dir, &mut out)
}

/// Prints the stored token record.
pub fn tokens(config: &AppConfig) -> ClientResult<()> {
    let store = FileCredentialStore::new(config.token_path());
    let credential = store.load()?;
    let stdout = std::io::stdout();
    write_tokens(&credential, &mut stdout.lock())
}

/// Writes a credential record as pretty JSON.
pub fn write_tokens<W: Write>(credential: &Credential, out: &mut W) -> ClientResult<()> {
    serde_json::to_writer_pretty(&mut *out, credential)?;
    writeln!(out)?;
    Ok(())
}

/// Runs the token and retrieval steps with an explicit current time.
///
/// A refreshed credential is saved before events are fetched. The token file
/// is not touched when no refresh was needed or the refresh failed.
pub async fn fetch_events_at(
    config: &AppConfig,
    overrides: &StravaOverrides,
    now: DateTime<Utc>,
) -> ClientResult<(EventSet, OutputFormatter)> {
    let strava = config
        .strava
        .with_overrides(overrides)
        .to_strava_config()
        .map_err(ClientError::Config)?;
    let formatter = OutputFormatter::new(
        config
            .output
            .format_options(&strava.club_id)
            .map_err(ClientError::Config)?,
    );

    let store = FileCredentialStore::new(config.token_path());
    let stored = store.load()?;

    let refresher = OAuthClient::new(&strava)?;
    let credential = ensure_fresh_token_at(stored.clone(), &refresher, strava.lookahead, now).await?;
    if credential != stored {
        store.save(&credential)?;
        info!(path = %store.path().display(), "saved refreshed strava tokens");
    }

    let events = retrieve(strava, &credential.access_token, now).await?;
    Ok((events, formatter))
}

async fn retrieve(
    strava: StravaConfig,
    access_token: &str,
    now: DateTime<Utc>,
) -> ClientResult<EventSet> {
    let club_id = strava.club_id.clone();
    let window = strava.window;
    let retriever = EventRetriever::new(strava)?;
    Ok(retriever
        .fetch_upcoming_events_at(&club_id, access_token, window, now)
        .await?)
}

/// Renders events and writes them to `out` or into `output_dir`.
///
/// Everything is rendered before anything is written.
pub fn write_events<W: Write>(
    formatter: &OutputFormatter,
    format: OutputFormat,
    events: &EventSet,
    output_dir: Option<&Path>,
    out: &mut W,
) -> ClientResult<()> {
    let rendered: Vec<(String, String)> = match format {
        OutputFormat::Json => {
            vec![(JSON_FILE_NAME.to_string(), formatter.format_json(events)?)]
        }
        OutputFormat::Markdown => events
            .iter()
            .map(|event| -> ClientResult<(String, String)> {
                Ok((format!("{}.md", event.id), formatter.format_markdown(event)?))
            })
            .collect::<ClientResult<_>>()?,
    };

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            for (name, content) in &rendered {
                let path = dir.join(name);
                std::fs::write(&path, content)?;
                debug!(path = %path.display(), "wrote event output");
            }
            info!(count = events.len(), dir = %dir.display(), "wrote upcoming events");
        }
        None => {
            for (i, (_, content)) in rendered.iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                write!(out, "{}", content)?;
                if !content.ends_with('\n') {
                    writeln!(out)?;
                }
            }
        }
    }

    Ok(())
}
