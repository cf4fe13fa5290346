//! CSV decoding and row extraction.

use tracing::{debug, warn};

use crate::models::{EventSet, GuestRecord};
use crate::source::LoadError;

use super::columns::{resolve_index, RawRow};
use super::parser::{parse_guest, FIRST_NAME_HEADERS, LAST_NAME_HEADERS};

const UTF8_BOM: &str = "\u{feff}";

/// Decode file bytes, falling back to Windows-1252 (spreadsheet tools still
/// emit it) when they are not valid UTF-8. A leading BOM is dropped.
pub fn decode_bytes(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Trim a header cell and straighten typographic apostrophes, so
/// "Saumya’s Vidhi & Haaldi" resolves like "Saumya's Vidhi & Haaldi".
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches(UTF8_BOM)
        .trim()
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Split CSV text into raw rows keyed by the (normalized) header row.
///
/// Ragged rows are tolerated: missing trailing cells read as empty and
/// surplus cells are ignored. Rows the CSV reader rejects are logged and
/// skipped, as are fully blank rows.
pub fn read_rows(text: &str) -> Result<Vec<RawRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Unparsable(format!("unreadable header row: {}", e)))?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::Unparsable("missing header row".to_string()));
    }

    let has_name_column = resolve_index(headers.iter().map(String::as_str), FIRST_NAME_HEADERS)
        .or_else(|| resolve_index(headers.iter().map(String::as_str), LAST_NAME_HEADERS))
        .is_some();
    if !has_name_column {
        return Err(LoadError::Unparsable(format!(
            "no name column among {} headers",
            headers.len()
        )));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                // +2: one for the header row, one for 1-based numbering
                warn!(line = index + 2, error = %e, "Skipping unreadable row");
                skipped += 1;
                continue;
            }
        };

        let row = RawRow::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.as_str(), record.get(i).unwrap_or(""))),
        );

        if row.is_blank() {
            debug!(line = index + 2, "Skipping blank row");
            continue;
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), skipped, "Read guest table");
    Ok(rows)
}

/// Parse CSV text into canonical records.
pub fn parse_guest_csv(text: &str, events: &EventSet) -> Result<Vec<GuestRecord>, LoadError> {
    let rows = read_rows(text)?;
    Ok(rows.iter().map(|row| parse_guest(row, events)).collect())
}

/// Decode and parse raw file bytes.
pub fn parse_guest_bytes(bytes: Vec<u8>, events: &EventSet) -> Result<Vec<GuestRecord>, LoadError> {
    parse_guest_csv(&decode_bytes(bytes), events)
}
