//! Upcoming event selection.
//!
//! Turns the raw `group_events` listing into an [`EventSet`]:
//!
//! 1. events whose id is excluded are skipped
//! 2. every occurrence is parsed; one bad timestamp fails the whole call
//! 3. an event qualifies if any occurrence is inside the upcoming window
//! 4. qualifying events get their title and description HTML-unescaped
//! 5. the first qualifying event per id is kept, later ones are dropped
//!
//! Upstream order is preserved.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use hcvelo_core::{ClubEvent, EventSet, UpcomingWindow};
use tracing::debug;

use crate::client::StravaClient;
use crate::config::StravaConfig;
use crate::error::StravaResult;

/// Filters and deduplicates raw events.
///
/// Returns an error, and no partial set, if any considered event carries an
/// unparseable occurrence.
pub fn select_upcoming(
    raw: Vec<ClubEvent>,
    window: UpcomingWindow,
    excluded: &HashSet<u64>,
) -> StravaResult<EventSet> {
    let mut selected = EventSet::new();

    for mut event in raw {
        if excluded.contains(&event.id) {
            debug!(id = event.id, "skipping excluded event");
            continue;
        }

        let occurrences = event.occurrences()?;
        if !occurrences.iter().any(|at| window.contains(*at)) {
            debug!(id = event.id, "no occurrence inside the upcoming window");
            continue;
        }

        if selected.contains(event.id) {
            debug!(id = event.id, "dropping repeated event");
            continue;
        }

        event.unescape_text();
        selected.insert(event);
    }

    Ok(selected)
}

/// Fetches and filters a club's upcoming events.
#[derive(Debug, Clone)]
pub struct EventRetriever {
    client: StravaClient,
}

impl EventRetriever {
    pub fn new(config: StravaConfig) -> StravaResult<Self> {
        Ok(Self {
            client: StravaClient::new(config)?,
        })
    }

    /// Fetches the configured club's events upcoming within the configured window.
    pub async fn fetch(&self, access_token: &str) -> StravaResult<EventSet> {
        let config = self.client.config();
        self.fetch_upcoming_events(&config.club_id, access_token, config.window)
            .await
    }

    /// Fetches events with an occurrence after `now - window`.
    pub async fn fetch_upcoming_events(
        &self,
        club_id: &str,
        access_token: &str,
        window: Duration,
    ) -> StravaResult<EventSet> {
        self.fetch_upcoming_events_at(club_id, access_token, window, Utc::now())
            .await
    }

    /// Like [`Self::fetch_upcoming_events`] with an explicit current time.
    pub async fn fetch_upcoming_events_at(
        &self,
        club_id: &str,
        access_token: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> StravaResult<EventSet> {
        let raw = self.client.list_group_events(club_id, access_token).await?;
        let raw_count = raw.len();

        let selected = select_upcoming(
            raw,
            UpcomingWindow::ending_at(now, window),
            &self.client.config().excluded_event_ids,
        )?;

        debug!(
            raw = raw_count,
            selected = selected.len(),
            "selected upcoming club events"
        );
        Ok(selected)
    }
}
