use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, info};

use crate::ingest::parse_guest_bytes;
use crate::models::{EventSet, GuestRecord};

use super::snapshot::latest_snapshot;
use super::LoadError;

/// HTTP request timeout in seconds when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where guest data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// A single CSV file.
    File(PathBuf),
    /// A scraper output directory; the newest complete snapshot is read.
    Directory(PathBuf),
    /// A published CSV, e.g. a sheet's "export as CSV" link.
    Url(String),
}

impl SourceLocation {
    /// `http(s)://` is a URL, an existing directory is a snapshot directory,
    /// anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return SourceLocation::Url(raw.to_string());
        }
        let path = PathBuf::from(raw);
        if path.is_dir() {
            SourceLocation::Directory(path)
        } else {
            SourceLocation::File(path)
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::File(path) | SourceLocation::Directory(path) => {
                write!(f, "{}", path.display())
            }
            SourceLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Result of one successful load.
#[derive(Debug, Clone)]
pub struct LoadedGuests {
    pub records: Vec<GuestRecord>,
    /// The file or URL actually read (the picked snapshot for directories).
    pub origin: String,
    pub loaded_at: DateTime<Utc>,
}

/// Reads and parses guest data from a `SourceLocation`.
///
/// Clone is cheap: the HTTP client and event set are shared.
#[derive(Clone)]
pub struct SourceLoader {
    client: Client,
    location: SourceLocation,
    events: Arc<EventSet>,
}

impl SourceLoader {
    pub fn new(location: SourceLocation, events: Arc<EventSet>) -> Result<Self, LoadError> {
        Self::with_timeout(
            location,
            events,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        location: SourceLocation,
        events: Arc<EventSet>,
        timeout: Duration,
    ) -> Result<Self, LoadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            location,
            events,
        })
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn events(&self) -> &Arc<EventSet> {
        &self.events
    }

    /// Read and parse the source. A failure anywhere fails the whole load.
    pub async fn load(&self) -> Result<LoadedGuests, LoadError> {
        let (bytes, origin) = self.fetch_bytes().await?;
        let size = bytes.len();
        let records = parse_guest_bytes(bytes, &self.events)?;

        info!(origin = %origin, bytes = size, guests = records.len(), "Loaded guest list");
        Ok(LoadedGuests {
            records,
            origin,
            loaded_at: Utc::now(),
        })
    }

    async fn fetch_bytes(&self) -> Result<(Vec<u8>, String), LoadError> {
        match &self.location {
            SourceLocation::File(path) => Ok((read_file(path).await?, path.display().to_string())),
            SourceLocation::Directory(dir) => {
                let path = latest_snapshot(dir).await?;
                Ok((read_file(&path).await?, path.display().to_string()))
            }
            SourceLocation::Url(url) => Ok((self.fetch_url(url).await?, url.clone())),
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(url, status = %status, "Guest list response received");

        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| LoadError::io(path.display().to_string(), e))
}
