//! Summary statistics for a (usually filtered) guest set.
//!
//! Everything here is a pure function of its input; the dashboard recomputes
//! it from scratch whenever the records or the filters change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{EventSet, Group, GuestRecord, RsvpStatus};

// ============================================================================
// Counters
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GroupCounts {
    pub bride: usize,
    pub groom: usize,
    pub unknown: usize,
}

impl GroupCounts {
    pub fn add(&mut self, group: Group) {
        match group {
            Group::Bride => self.bride += 1,
            Group::Groom => self.groom += 1,
            Group::Unknown => self.unknown += 1,
        }
    }

    pub fn get(&self, group: Group) -> usize {
        match group {
            Group::Bride => self.bride,
            Group::Groom => self.groom,
            Group::Unknown => self.unknown,
        }
    }

    /// Bride + Groom; guests with an unknown group stay out of headline numbers.
    pub fn headline_total(&self) -> usize {
        self.bride + self.groom
    }

    pub fn total(&self) -> usize {
        self.bride + self.groom + self.unknown
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StatusCounts {
    pub attending: usize,
    pub declined: usize,
    pub no_response: usize,
    pub not_invited: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: RsvpStatus) {
        match status {
            RsvpStatus::Attending => self.attending += 1,
            RsvpStatus::Declined => self.declined += 1,
            RsvpStatus::NoResponse => self.no_response += 1,
            RsvpStatus::NotInvited => self.not_invited += 1,
        }
    }

    pub fn get(&self, status: RsvpStatus) -> usize {
        match status {
            RsvpStatus::Attending => self.attending,
            RsvpStatus::Declined => self.declined,
            RsvpStatus::NoResponse => self.no_response,
            RsvpStatus::NotInvited => self.not_invited,
        }
    }

    /// Guests who answered either way.
    pub fn responded(&self) -> usize {
        self.attending + self.declined
    }

    /// Guests invited to the event, whether or not they answered.
    pub fn invited(&self) -> usize {
        self.attending + self.declined + self.no_response
    }

    pub fn total(&self) -> usize {
        self.invited() + self.not_invited
    }
}

/// Percentage of invited guests who answered, to two decimals. Zero when
/// nobody was invited.
pub fn response_rate(counts: &StatusCounts) -> f64 {
    let invited = counts.invited();
    if invited == 0 {
        return 0.0;
    }
    let rate = counts.responded() as f64 / invited as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct EventBreakdown {
    pub key: String,
    pub label: String,
    pub counts: StatusCounts,
    pub attending_by_group: GroupCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SideCount {
    pub side: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SummaryStats {
    pub total: usize,
    pub groups: GroupCounts,
    /// Key of the event the response rate is based on.
    pub primary_event: String,
    pub response_rate: f64,
    /// One entry per tracked event, in event order.
    pub events: Vec<EventBreakdown>,
    /// Guests per relationship label, largest first; ties keep
    /// first-seen order.
    pub sides: Vec<SideCount>,
}

impl SummaryStats {
    pub fn primary(&self) -> Option<&EventBreakdown> {
        self.events.iter().find(|e| e.key == self.primary_event)
    }
}

/// Aggregate `guests` in a single pass.
pub fn summarize<'a, I>(guests: I, events: &EventSet) -> SummaryStats
where
    I: IntoIterator<Item = &'a GuestRecord>,
{
    let mut total = 0;
    let mut groups = GroupCounts::default();
    let mut breakdowns: Vec<EventBreakdown> = events
        .events()
        .iter()
        .map(|e| EventBreakdown {
            key: e.key.clone(),
            label: e.label.clone(),
            counts: StatusCounts::default(),
            attending_by_group: GroupCounts::default(),
        })
        .collect();
    let mut sides = SideTally::default();

    for guest in guests {
        total += 1;
        groups.add(guest.group);
        sides.add(&guest.side);

        for (i, breakdown) in breakdowns.iter_mut().enumerate() {
            let status = guest.status(i);
            breakdown.counts.add(status);
            if status == RsvpStatus::Attending {
                breakdown.attending_by_group.add(guest.group);
            }
        }
    }

    let primary = &breakdowns[events.primary_index()];
    SummaryStats {
        total,
        groups,
        primary_event: primary.key.clone(),
        response_rate: response_rate(&primary.counts),
        events: breakdowns,
        sides: sides.into_sorted(),
    }
}

/// Counts per label, remembering the order labels were first seen.
#[derive(Default)]
struct SideTally {
    counts: Vec<SideCount>,
    index: HashMap<String, usize>,
}

impl SideTally {
    fn add(&mut self, side: &str) {
        match self.index.get(side) {
            Some(&i) => self.counts[i].count += 1,
            None => {
                self.index.insert(side.to_string(), self.counts.len());
                self.counts.push(SideCount {
                    side: side.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn into_sorted(mut self) -> Vec<SideCount> {
        // sort_by is stable, so equal counts stay in first-seen order
        self.counts.sort_by(|a, b| b.count.cmp(&a.count));
        self.counts
    }
}

/// Distinct relationship labels in first-seen order, blanks skipped.
pub fn side_options<'a, I>(guests: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a GuestRecord>,
{
    let mut seen = std::collections::HashSet::new();
    guests
        .into_iter()
        .filter(|g| !g.side.trim().is_empty())
        .filter(|g| seen.insert(g.side.as_str()))
        .map(|g| g.side.clone())
        .collect()
}

// ============================================================================
// Duplicate names
// ============================================================================

/// A full name that appears on more than one record, e.g. two different
/// guests called "Dipti Patel" on opposite sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DuplicateName {
    pub name: String,
    pub count: usize,
    /// Relationship label of each occurrence, in record order.
    pub sides: Vec<String>,
}

/// Names (compared case-insensitively) shared by several records, in
/// first-seen order.
pub fn duplicate_names<'a, I>(guests: I) -> Vec<DuplicateName>
where
    I: IntoIterator<Item = &'a GuestRecord>,
{
    let mut found: Vec<DuplicateName> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for guest in guests {
        let name = guest.full_name();
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(&i) => {
                found[i].count += 1;
                found[i].sides.push(guest.side.clone());
            }
            None => {
                index.insert(key, found.len());
                found.push(DuplicateName {
                    name,
                    count: 1,
                    sides: vec![guest.side.clone()],
                });
            }
        }
    }

    found.retain(|d| d.count > 1);
    found
}
