//! Output rendering for club events.
//!
//! Two outputs are supported:
//! - **JSON**: the event set as a pretty-printed array, using Strava's field names
//! - **Markdown**: one document per event, produced from a `{placeholder}` template
//!
//! # Template placeholders
//!
//! | placeholder     | value                                              |
//! |-----------------|----------------------------------------------------|
//! | `{id}`          | Strava event id                                    |
//! | `{title}`       | event title                                        |
//! | `{description}` | event description                                  |
//! | `{address}`     | meeting point                                      |
//! | `{date}`        | first occurrence, `DD-MM-YYYY` in the display zone |
//! | `{time}`        | first occurrence, `HH:MM` in the display zone      |
//! | `{url}`         | link to the event on strava.com                    |
//! | `{club_id}`     | club id                                            |
//!
//! Unknown placeholders are left untouched.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{ClubEvent, EventSet};
use crate::time::OccurrenceParseError;

/// Base URL used for links back to Strava.
const STRAVA_WEB_BASE: &str = "https://www.strava.com";

/// Template used when no template file is configured.
pub const DEFAULT_MARKDOWN_TEMPLATE: &str = "\
## {title}

- **Date:** {date}
- **Time:** {time}
- **Meeting point:** {address}
- **Strava:** <{url}>

{description}
";

/// Errors raised while rendering events.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The event has no occurrence to take a date and time from.
    #[error("event {id} has no upcoming occurrences")]
    MissingOccurrence {
        /// Event id.
        id: u64,
    },

    /// The first occurrence could not be parsed.
    #[error(transparent)]
    Occurrence(#[from] OccurrenceParseError),

    /// JSON serialization failed.
    #[error("failed to serialize events: {0}")]
    Json(#[from] serde_json::Error),
}

/// The output format for event rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Pretty-printed JSON array.
    #[default]
    Json,
    /// One Markdown document per event.
    #[serde(rename = "md")]
    Markdown,
}

/// Options for rendering events.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Club id, used to build event URLs.
    pub club_id: String,
    /// Zone used for the `{date}` and `{time}` placeholders.
    pub timezone: Tz,
    /// Markdown template.
    pub template: String,
}

impl FormatOptions {
    /// Creates options for a club with the default template and zone.
    pub fn new(club_id: impl Into<String>) -> Self {
        Self {
            club_id: club_id.into(),
            timezone: chrono_tz::Europe::London,
            template: DEFAULT_MARKDOWN_TEMPLATE.to_string(),
        }
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

/// A display-ready view of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub address: String,
    pub date: String,
    pub time: String,
    pub url: String,
    pub club_id: String,
}

impl EventView {
    /// Builds a view from the event's first listed occurrence.
    pub fn from_event(event: &ClubEvent, club_id: &str, tz: &Tz) -> Result<Self, FormatError> {
        let first = event
            .first_occurrence()
            .ok_or(FormatError::MissingOccurrence { id: event.id })??;
        let local = first.with_timezone(tz);

        Ok(Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            address: event.address.clone(),
            date: local.format("%d-%m-%Y").to_string(),
            time: local.format("%H:%M").to_string(),
            url: event_url(club_id, event.id),
            club_id: club_id.to_string(),
        })
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let value = match key {
            "id" => self.id.to_string(),
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "address" => self.address.clone(),
            "date" => self.date.clone(),
            "time" => self.time.clone(),
            "url" => self.url.clone(),
            "club_id" => self.club_id.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// Renders events as JSON or Markdown.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Renders the whole set as a pretty-printed JSON array.
    pub fn format_json(&self, events: &EventSet) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(events)?)
    }

    /// Renders one event through the Markdown template.
    pub fn format_markdown(&self, event: &ClubEvent) -> Result<String, FormatError> {
        let view = EventView::from_event(event, &self.options.club_id, &self.options.timezone)?;
        Ok(fill_template(&self.options.template, |key| view.lookup(key)))
    }
}

/// Returns the strava.com URL of a club event.
pub fn event_url(club_id: &str, event_id: u64) -> String {
    format!(
        "{}/clubs/{}/group_events/{}",
        STRAVA_WEB_BASE, club_id, event_id
    )
}

/// Replaces `{key}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so a title containing `{url}`
/// is emitted verbatim.
fn fill_template<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match lookup(key) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
