//! rsvpboard core - guest RSVP parsing, filtering and statistics.
//!
//! Tabular guest exports (the RSVP site's CSV export or the guest scraper's
//! snapshots) are parsed into canonical `GuestRecord`s, filtered by group,
//! primary-event status, relationship label and free text, and summarized
//! into per-event and per-side counts.

pub mod config;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod models;
pub mod retry;
pub mod source;
pub mod state;
pub mod stats;
pub mod utils;

pub use config::Config;
pub use export::{export_to_path, export_to_string, ExportError, ExportOptions};
pub use filter::{filter_guests, FilterCriteria, QueryScope, Selection};
pub use ingest::{parse_guest, parse_guest_bytes, parse_guest_csv, RawRow};
pub use models::{EventSet, Group, GuestRecord, RsvpStatus, TrackedEvent};
pub use retry::{run_with_retries, FailureLog, RetryConfig, RetryOutcome, RetryTarget};
pub use source::{LoadError, LoadedGuests, SourceLoader, SourceLocation};
pub use state::{Dashboard, LoadState};
pub use stats::{summarize, SummaryStats};
