//! Occurrence timestamps and the "upcoming" window.
//!
//! Strava reports each scheduled instance of a group event as an RFC 3339
//! string. This module parses those strings and decides whether an instance
//! still counts as upcoming relative to a cutoff.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// An occurrence string that is not a valid RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid occurrence timestamp {value:?}: {reason}")]
pub struct OccurrenceParseError {
    /// The offending input.
    pub value: String,
    /// Parser message.
    pub reason: String,
}

/// Parses an occurrence timestamp into UTC.
pub fn parse_occurrence(value: &str) -> Result<DateTime<Utc>, OccurrenceParseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| OccurrenceParseError {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// The forward-looking window used to decide which events are upcoming.
///
/// Anything strictly after `cutoff` is upcoming. The cutoff sits in the past
/// so that rides which started a little while ago are still listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingWindow {
    /// Occurrences at or before this instant are considered past.
    pub cutoff: DateTime<Utc>,
}

impl UpcomingWindow {
    /// Builds a window reaching `lookback` into the past from `now`.
    ///
    /// A lookback past the representable range clamps the cutoff to
    /// [`DateTime::<Utc>::MIN_UTC`].
    pub fn ending_at(now: DateTime<Utc>, lookback: Duration) -> Self {
        Self {
            cutoff: now
                .checked_sub_signed(lookback)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Returns true if `at` is strictly after the cutoff.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at > self.cutoff
    }
}
