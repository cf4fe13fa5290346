//! Discovery of timestamped guest snapshots.
//!
//! The scraper writes `zola_guests_2024-05-01_18-30-00.csv` on success and
//! tags incomplete runs with `_partial`, `_error` or `_interrupted`.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use super::LoadError;

/// Timestamp embedded in snapshot and failure-log file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Length of a rendered `TIMESTAMP_FORMAT`.
const TIMESTAMP_LEN: usize = 19;

/// Name fragments marking an incomplete snapshot.
const INCOMPLETE_MARKERS: &[&str] = &["partial", "error", "interrupted"];

/// First timestamp found anywhere in `name`.
pub fn snapshot_timestamp(name: &str) -> Option<NaiveDateTime> {
    (0..name.len())
        .filter_map(|start| name.get(start..start + TIMESTAMP_LEN))
        .find_map(|window| NaiveDateTime::parse_from_str(window, TIMESTAMP_FORMAT).ok())
}

/// Whether `name` is a complete CSV snapshot.
pub fn is_complete_snapshot(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".csv") && !INCOMPLETE_MARKERS.iter().any(|m| lower.contains(m))
}

/// The complete snapshot with the newest timestamp. On equal timestamps the
/// later name wins.
pub fn pick_latest<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| is_complete_snapshot(name))
        .filter_map(|name| snapshot_timestamp(name).map(|ts| (ts, name)))
        .max()
        .map(|(_, name)| name)
}

/// Path of the newest complete snapshot in `dir`.
pub async fn latest_snapshot(dir: &Path) -> Result<PathBuf, LoadError> {
    let dir_label = dir.display().to_string();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| LoadError::io(dir_label.clone(), e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LoadError::io(dir_label.clone(), e))?
    {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }

    let latest = pick_latest(names.iter().map(String::as_str))
        .ok_or_else(|| LoadError::NoSnapshot(dir_label))?;
    debug!(dir = %dir.display(), snapshot = latest, candidates = names.len(), "Picked snapshot");
    Ok(dir.join(latest))
}
