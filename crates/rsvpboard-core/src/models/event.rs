use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of the event used for status filtering and the response rate
/// unless configured otherwise.
pub const DEFAULT_PRIMARY_EVENT: &str = "wedding";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventSetError {
    #[error("At least one tracked event is required")]
    Empty,

    #[error("Duplicate event key: {0}")]
    DuplicateKey(String),

    #[error("Primary event '{0}' is not a tracked event")]
    UnknownPrimary(String),
}

/// An event guests RSVP to, and the header spellings its status column
/// goes by in the different export formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TrackedEvent {
    pub key: String,
    /// Display name; also the column header written on export.
    pub label: String,
    /// Alternate header spellings, tried after the label.
    #[serde(default)]
    pub headers: Vec<String>,
}

impl TrackedEvent {
    pub fn new(key: &str, label: &str, headers: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Header patterns in resolution order: the label, then the alternates.
    pub fn patterns(&self) -> Vec<&str> {
        let mut patterns = vec![self.label.as_str()];
        for header in &self.headers {
            if !patterns.contains(&header.as_str()) {
                patterns.push(header.as_str());
            }
        }
        patterns
    }
}

/// The events tracked by the dashboard, in column order.
///
/// The RSVP export names columns after the event ("Wedding"); the guest
/// scraper prefixes them ("RSVP_Wedding") and spells out the ampersand.
pub fn default_events() -> Vec<TrackedEvent> {
    vec![
        TrackedEvent::new(
            "bride_vidhi",
            "Saumya's Vidhi & Haaldi",
            &["RSVP_Saumyas_Vidhi_and_Haaldi"],
        ),
        TrackedEvent::new(
            "groom_vidhi",
            "Mahek's Vidhi & Haaldi",
            &["RSVP_Maheks_Vidhi_and_Haaldi"],
        ),
        TrackedEvent::new("wedding", "Wedding", &["RSVP_Wedding"]),
        TrackedEvent::new("reception", "Reception", &["RSVP_Reception"]),
    ]
}

/// Ordered, non-empty list of tracked events with one primary event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSet {
    events: Vec<TrackedEvent>,
    primary: usize,
}

impl EventSet {
    pub fn new(events: Vec<TrackedEvent>, primary_key: &str) -> Result<Self, EventSetError> {
        if events.is_empty() {
            return Err(EventSetError::Empty);
        }

        let mut seen = HashSet::new();
        for event in &events {
            if !seen.insert(event.key.as_str()) {
                return Err(EventSetError::DuplicateKey(event.key.clone()));
            }
        }

        let primary = events
            .iter()
            .position(|e| e.key == primary_key)
            .ok_or_else(|| EventSetError::UnknownPrimary(primary_key.to_string()))?;

        Ok(Self { events, primary })
    }

    pub fn events(&self) -> &[TrackedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn primary_index(&self) -> usize {
        self.primary
    }

    pub fn primary(&self) -> &TrackedEvent {
        &self.events[self.primary]
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.events.iter().position(|e| e.key == key)
    }
}

impl Default for EventSet {
    fn default() -> Self {
        let events = default_events();
        let primary = events
            .iter()
            .position(|e| e.key == DEFAULT_PRIMARY_EVENT)
            .unwrap_or(0);
        Self { events, primary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_event_set_primary_is_wedding() {
        let events = EventSet::default();
        assert_eq!(events.len(), 4);
        assert_eq!(events.primary().key, "wedding");
        assert_eq!(events.primary_index(), 2);
    }

    #[test]
    fn test_patterns_start_with_label_and_skip_duplicates() {
        let event = TrackedEvent::new("wedding", "Wedding", &["Wedding", "RSVP_Wedding"]);
        assert_eq!(event.patterns(), vec!["Wedding", "RSVP_Wedding"]);
    }

    #[test]
    fn test_event_set_validation() {
        assert_eq!(EventSet::new(vec![], "wedding"), Err(EventSetError::Empty));

        let dupes = vec![
            TrackedEvent::new("wedding", "Wedding", &[]),
            TrackedEvent::new("wedding", "Ceremony", &[]),
        ];
        assert_eq!(
            EventSet::new(dupes, "wedding"),
            Err(EventSetError::DuplicateKey("wedding".to_string()))
        );

        let events = vec![TrackedEvent::new("reception", "Reception", &[])];
        assert_eq!(
            EventSet::new(events, "wedding"),
            Err(EventSetError::UnknownPrimary("wedding".to_string()))
        );
    }

    #[test]
    fn test_position_lookup() {
        let events = EventSet::default();
        assert_eq!(events.position("reception"), Some(3));
        assert_eq!(events.position("sangeet"), None);
    }
}
