//! Guest data sources: local files, scraper snapshot directories and URLs.

mod error;
mod loader;
pub mod snapshot;

pub use error::LoadError;
pub use loader::{LoadedGuests, SourceLoader, SourceLocation, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use snapshot::{latest_snapshot, pick_latest, TIMESTAMP_FORMAT};
