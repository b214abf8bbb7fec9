//! Club event types.
//!
//! - [`ClubEvent`]: one group event as listed by Strava
//! - [`EventSet`]: an ordered collection of events with unique ids

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::time::{OccurrenceParseError, parse_occurrence};

/// A club group event.
///
/// Field names match the Strava `group_events` payload so the same type is
/// used for decoding the API response and for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubEvent {
    /// Stable upstream identifier.
    pub id: u64,

    /// Event title. May contain HTML entities until unescaped.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Free-text description. May contain HTML entities until unescaped.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Meeting point.
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,

    /// Date string as reported upstream.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,

    /// Scheduled instances, in upstream order (not guaranteed sorted).
    #[serde(default, deserialize_with = "null_as_default")]
    pub upcoming_occurrences: Vec<String>,
}

impl ClubEvent {
    /// Creates an event with the given id and title and no other details.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            address: String::new(),
            date: String::new(),
            upcoming_occurrences: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Appends an occurrence timestamp.
    pub fn with_occurrence(mut self, occurrence: impl Into<String>) -> Self {
        self.upcoming_occurrences.push(occurrence.into());
        self
    }

    /// Parses every occurrence, failing on the first invalid one.
    pub fn occurrences(&self) -> Result<Vec<DateTime<Utc>>, OccurrenceParseError> {
        self.upcoming_occurrences
            .iter()
            .map(|o| parse_occurrence(o))
            .collect()
    }

    /// Parses the first listed occurrence, if any.
    pub fn first_occurrence(&self) -> Option<Result<DateTime<Utc>, OccurrenceParseError>> {
        self.upcoming_occurrences
            .first()
            .map(|o| parse_occurrence(o))
    }

    /// Decodes HTML entities in the title and description.
    pub fn unescape_text(&mut self) {
        self.title = unescape_html(&self.title);
        self.description = unescape_html(&self.description);
    }
}

/// Decodes HTML entities (`&amp;`, `&#39;`, ...) into plain text.
///
/// Text without entities is returned unchanged.
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An ordered set of club events keyed by id.
///
/// Insertion order is preserved and the first event inserted for an id wins;
/// later events with the same id are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSet {
    events: Vec<ClubEvent>,
    ids: HashSet<u64>,
}

impl EventSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an event unless one with the same id is already present.
    ///
    /// Returns true if the event was added.
    pub fn insert(&mut self, event: ClubEvent) -> bool {
        if !self.ids.insert(event.id) {
            return false;
        }
        self.events.push(event);
        true
    }

    /// Returns true if an event with this id is present.
    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClubEvent> {
        self.events.iter()
    }

    /// Returns the events as a slice, in insertion order.
    pub fn as_slice(&self) -> &[ClubEvent] {
        &self.events
    }
}

impl Serialize for EventSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.events.serialize(serializer)
    }
}

impl FromIterator<ClubEvent> for EventSet {
    fn from_iter<I: IntoIterator<Item = ClubEvent>>(iter: I) -> Self {
        let mut set = Self::new();
        for event in iter {
            set.insert(event);
        }
        set
    }
}

impl IntoIterator for EventSet {
    type Item = ClubEvent;
    type IntoIter = std::vec::IntoIter<ClubEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a ClubEvent;
    type IntoIter = std::slice::Iter<'a, ClubEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_strava_payload() {
        let json = r#"{
            "id": 1611651,
            "resource_state": 2,
            "title": "Chain Gang",
            "description": "Fast &amp; furious",
            "address": "Holmes Chapel",
            "date": "2024-06-01",
            "upcoming_occurrences": ["2024-06-05T18:30:00Z", "2024-06-12T18:30:00Z"]
        }"#;

        let event: ClubEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, 1611651);
        assert_eq!(event.description, "Fast &amp; furious");
        assert_eq!(event.upcoming_occurrences.len(), 2);
    }

    #[test]
    fn null_fields_become_empty() {
        let json = r#"{"id": 7, "title": "Social", "description": null, "upcoming_occurrences": null}"#;
        let event: ClubEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.description, "");
        assert!(event.upcoming_occurrences.is_empty());
        assert_eq!(event.address, "");
    }

    #[test]
    fn unescape_decodes_entities() {
        let mut event = ClubEvent::new(1, "Tom &amp; Jerry&#39;s ride")
            .with_description("&lt;b&gt;coffee&lt;/b&gt; &quot;stop&quot;");
        event.unescape_text();
        assert_eq!(event.title, "Tom & Jerry's ride");
        assert_eq!(event.description, "<b>coffee</b> \"stop\"");
    }

    #[test]
    fn unescape_plain_text_is_noop() {
        let plain = "Sunday club run, 60 miles - cafe stop at Rudheath";
        assert_eq!(unescape_html(plain), plain);
        assert_eq!(unescape_html(&unescape_html(plain)), plain);
    }

    #[test]
    fn occurrences_fail_on_first_bad_value() {
        let event = ClubEvent::new(1, "Ride")
            .with_occurrence("2024-06-05T18:30:00Z")
            .with_occurrence("next tuesday");
        let err = event.occurrences().unwrap_err();
        assert_eq!(err.value, "next tuesday");
    }

    #[test]
    fn first_occurrence_none_when_empty() {
        assert!(ClubEvent::new(1, "Ride").first_occurrence().is_none());
    }

    #[test]
    fn event_set_keeps_first_insert() {
        let mut set = EventSet::new();
        assert!(set.insert(ClubEvent::new(1, "first")));
        assert!(set.insert(ClubEvent::new(2, "other")));
        assert!(!set.insert(ClubEvent::new(1, "second")));

        assert_eq!(set.len(), 2);
        assert!(set.contains(1));
        let titles: Vec<_> = set.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "other"]);
    }

    #[test]
    fn event_set_serializes_as_array() {
        let set: EventSet = vec![ClubEvent::new(3, "Ride")].into_iter().collect();
        let value = serde_json::to_value(&set).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], 3);
        assert_eq!(value[0]["upcoming_occurrences"], serde_json::json!([]));
    }
}
