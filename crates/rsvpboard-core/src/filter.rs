//! Guest filtering.
//!
//! A `FilterCriteria` is a snapshot of the predicates the user has selected.
//! Every active predicate must hold (logical AND); inactive ones are skipped.
//! Filtering is stable: matches come back in their original order.

use serde::{Deserialize, Serialize};

use crate::models::{EventSet, Group, GuestRecord, RsvpStatus};
use crate::utils::contains_ignore_case;

/// Either every value, or one specific value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Selection::Only(v),
            None => Selection::All,
        }
    }
}

/// Which fields the free-text query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryScope {
    /// "First Last"
    #[default]
    Names,
    /// "First Last" or the relationship label
    NamesAndSide,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub group: Selection<Group>,
    /// Compared against the primary event's status.
    pub status: Selection<RsvpStatus>,
    /// Exact relationship label.
    pub side: Selection<String>,
    pub query: String,
    pub scope: QueryScope,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Selection::Only(group);
        self
    }

    pub fn with_status(mut self, status: RsvpStatus) -> Self {
        self.status = Selection::Only(status);
        self
    }

    pub fn with_side(mut self, side: impl Into<String>) -> Self {
        self.side = Selection::Only(side.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>, scope: QueryScope) -> Self {
        self.query = query.into();
        self.scope = scope;
        self
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.group.is_all()
            && self.status.is_all()
            && self.side.is_all()
            && self.query.trim().is_empty()
    }

    /// Whether `guest` passes every active predicate. `primary` is the index
    /// of the event the status predicate looks at.
    pub fn matches(&self, guest: &GuestRecord, primary: usize) -> bool {
        self.group.matches(&guest.group)
            && self.status.matches(&guest.status(primary))
            && self.side.matches(&guest.side)
            && self.matches_query(guest)
    }

    fn matches_query(&self, guest: &GuestRecord) -> bool {
        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }

        let name = format!("{} {}", guest.first_name, guest.last_name);
        contains_ignore_case(&name, query)
            || (self.scope == QueryScope::NamesAndSide && contains_ignore_case(&guest.side, query))
    }
}

/// Records passing `criteria`, in their original order.
pub fn filter_guests<'a>(
    guests: &'a [GuestRecord],
    criteria: &FilterCriteria,
    events: &EventSet,
) -> Vec<&'a GuestRecord> {
    let primary = events.primary_index();
    guests
        .iter()
        .filter(|g| criteria.matches(g, primary))
        .collect()
}
