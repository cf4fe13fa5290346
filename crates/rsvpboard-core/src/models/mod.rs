//! Data models for guest RSVP data.
//!
//! This module contains the value types shared by every stage of the
//! pipeline:
//!
//! - `GuestRecord`: one invited individual, as produced by the record parser
//! - `RsvpStatus`, `Group`: normalized per-event status and Bride/Groom group
//! - `TrackedEvent`, `EventSet`: the ordered list of events a record carries
//!   a status for, and which of them is the primary event

pub mod event;
pub mod guest;

pub use event::{default_events, EventSet, EventSetError, TrackedEvent, DEFAULT_PRIMARY_EVENT};
pub use guest::{Group, GuestRecord, ParseSelectionError, RsvpStatus};
