use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a filter value typed by the user does not name a known
/// status or group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized {kind}: {value}")]
pub struct ParseSelectionError {
    kind: &'static str,
    value: String,
}

/// Lowercase and drop separators so "No Response", "no-response" and
/// "no_response" compare equal.
fn selection_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// RSVP Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum RsvpStatus {
    Attending,
    Declined,
    NoResponse,
    NotInvited,
}

impl RsvpStatus {
    /// All statuses in display order.
    pub const ALL: [RsvpStatus; 4] = [
        RsvpStatus::Attending,
        RsvpStatus::Declined,
        RsvpStatus::NoResponse,
        RsvpStatus::NotInvited,
    ];

    /// Normalize a raw status cell.
    ///
    /// Only the exact export spellings are recognized (after trimming).
    /// Anything else, including an empty cell or a missing column, is
    /// treated as no response.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Attending" => RsvpStatus::Attending,
            "Declined" => RsvpStatus::Declined,
            "Not Invited" => RsvpStatus::NotInvited,
            _ => RsvpStatus::NoResponse,
        }
    }

    /// The spelling used in exported files.
    pub fn label(&self) -> &'static str {
        match self {
            RsvpStatus::Attending => "Attending",
            RsvpStatus::Declined => "Declined",
            RsvpStatus::NoResponse => "No Response",
            RsvpStatus::NotInvited => "Not Invited",
        }
    }
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lenient parsing for user input (CLI flags, saved filters).
/// Unlike `from_raw`, unknown values are an error here.
impl FromStr for RsvpStatus {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match selection_key(s).as_str() {
            "attending" | "yes" => Ok(RsvpStatus::Attending),
            "declined" | "no" => Ok(RsvpStatus::Declined),
            "noresponse" | "pending" => Ok(RsvpStatus::NoResponse),
            "notinvited" => Ok(RsvpStatus::NotInvited),
            _ => Err(ParseSelectionError {
                kind: "RSVP status",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Group
// ============================================================================

/// Which half of the couple a guest was invited by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Group {
    Bride,
    Groom,
    #[default]
    Unknown,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::Bride, Group::Groom, Group::Unknown];

    /// Only the literal labels "Bride" and "Groom" are recognized.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Bride" => Group::Bride,
            "Groom" => Group::Groom,
            _ => Group::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Group::Bride => "Bride",
            Group::Groom => "Groom",
            Group::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Group {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match selection_key(s).as_str() {
            "bride" => Ok(Group::Bride),
            "groom" => Ok(Group::Groom),
            "unknown" => Ok(Group::Unknown),
            _ => Err(ParseSelectionError {
                kind: "group",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Guest Record
// ============================================================================

/// One invited individual.
///
/// `rsvp` holds one status per tracked event, in `EventSet` order.
/// Records are never edited after parsing; a refresh replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GuestRecord {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub suffix: String,
    /// Free-text relationship label, e.g. "Saumya's Family".
    pub side: String,
    pub group: Group,
    pub rsvp: Vec<RsvpStatus>,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl GuestRecord {
    /// "First Last", skipping whichever part is empty.
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }

    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{}, {}", self.last_name, self.first_name)
        }
    }

    /// Status for the event at `index`; events the record has no slot for
    /// count as no response.
    pub fn status(&self, index: usize) -> RsvpStatus {
        self.rsvp
            .get(index)
            .copied()
            .unwrap_or(RsvpStatus::NoResponse)
    }

    pub fn has_contact(&self) -> bool {
        !self.email.is_empty() || !self.phone.is_empty() || !self.address.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
