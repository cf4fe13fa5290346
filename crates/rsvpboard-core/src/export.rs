//! CSV export in the RSVP-export header scheme.

use std::io::Write;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::{EventSet, GuestRecord};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Append Email, Phone and Address columns.
    pub include_contacts: bool,
}

/// Header row for an export of `events`.
pub fn export_headers(events: &EventSet, options: ExportOptions) -> Vec<String> {
    let mut headers: Vec<String> = ["Title", "First Name", "Last Name", "Suffix"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    headers.extend(events.events().iter().map(|e| e.label.clone()));
    headers.push("Side".to_string());
    headers.push("Bride_or_Groom".to_string());
    if options.include_contacts {
        headers.extend(["Email", "Phone", "Address"].iter().map(|h| h.to_string()));
    }
    headers
}

/// Write `guests` as CSV to `writer`. Every cell is quoted.
pub fn write_guests<'a, W, I>(
    writer: W,
    guests: I,
    events: &EventSet,
    options: ExportOptions,
) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a GuestRecord>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(export_headers(events, options))?;

    let mut written = 0;
    for guest in guests {
        let mut row: Vec<&str> = vec![
            guest.title.as_str(),
            guest.first_name.as_str(),
            guest.last_name.as_str(),
            guest.suffix.as_str(),
        ];
        for i in 0..events.len() {
            row.push(guest.status(i).label());
        }
        row.push(guest.side.as_str());
        row.push(guest.group.label());
        if options.include_contacts {
            row.push(guest.email.as_str());
            row.push(guest.phone.as_str());
            row.push(guest.address.as_str());
        }
        csv_writer.write_record(&row)?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}

pub fn export_to_string<'a, I>(
    guests: I,
    events: &EventSet,
    options: ExportOptions,
) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a GuestRecord>,
{
    let mut buffer = Vec::new();
    write_guests(&mut buffer, guests, events, options)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Export to a file, replacing it if present. Returns the number of rows.
pub fn export_to_path<'a, I>(
    path: &Path,
    guests: I,
    events: &EventSet,
    options: ExportOptions,
) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a GuestRecord>,
{
    let file = std::fs::File::create(path)?;
    let written = write_guests(std::io::BufWriter::new(file), guests, events, options)?;
    info!(path = %path.display(), rows = written, "Exported guest list");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_guest_csv;
    use crate::models::{Group, RsvpStatus};

    fn sample() -> Vec<GuestRecord> {
        vec![
            GuestRecord {
                title: "Dr.".to_string(),
                first_name: "Asha".to_string(),
                last_name: "Patel".to_string(),
                side: "Saumya's \"Inner\" Circle".to_string(),
                group: Group::Bride,
                rsvp: vec![
                    RsvpStatus::Attending,
                    RsvpStatus::NotInvited,
                    RsvpStatus::Attending,
                    RsvpStatus::Declined,
                ],
                email: "asha@example.com".to_string(),
                phone: "555-123-4567".to_string(),
                address: "1 Main St, Edison, NJ".to_string(),
                ..Default::default()
            },
            GuestRecord {
                first_name: "Ravi".to_string(),
                last_name: "Shah".to_string(),
                suffix: "Jr".to_string(),
                side: "Mahek's Friend".to_string(),
                group: Group::Unknown,
                rsvp: vec![RsvpStatus::NoResponse; 4],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_headers_follow_event_order() {
        let headers = export_headers(&EventSet::default(), ExportOptions::default());
        assert_eq!(
            headers,
            vec![
                "Title",
                "First Name",
                "Last Name",
                "Suffix",
                "Saumya's Vidhi & Haaldi",
                "Mahek's Vidhi & Haaldi",
                "Wedding",
                "Reception",
                "Side",
                "Bride_or_Groom",
            ]
        );

        let with_contacts = export_headers(
            &EventSet::default(),
            ExportOptions { include_contacts: true },
        );
        assert_eq!(with_contacts.len(), 13);
        assert_eq!(with_contacts.last().map(String::as_str), Some("Address"));
    }

    #[test]
    fn test_every_cell_is_quoted() {
        let guests = sample();
        let csv = export_to_string(&guests[1..], &EventSet::default(), ExportOptions::default())
            .unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("\"Title\",\"First Name\""));
        assert_eq!(
            lines.next().unwrap(),
            "\"\",\"Ravi\",\"Shah\",\"Jr\",\"No Response\",\"No Response\",\"No Response\",\
             \"No Response\",\"Mahek's Friend\",\"Unknown\""
        );
    }

    #[test]
    fn test_export_reparses_to_same_records() {
        let events = EventSet::default();
        let guests = sample();

        let csv = export_to_string(&guests, &events, ExportOptions { include_contacts: true })
            .unwrap();
        assert_eq!(parse_guest_csv(&csv, &events).unwrap(), guests);
    }

    #[test]
    fn test_export_without_contacts_drops_them() {
        let events = EventSet::default();
        let guests = sample();

        let csv = export_to_string(&guests, &events, ExportOptions::default()).unwrap();
        let parsed = parse_guest_csv(&csv, &events).unwrap();
        assert!(parsed.iter().all(|g| !g.has_contact()));
        assert_eq!(parsed[0].side, guests[0].side);
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guests.csv");
        let guests = sample();

        let written =
            export_to_path(&path, &guests, &EventSet::default(), ExportOptions::default()).unwrap();
        assert_eq!(written, 2);
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"Asha\""));
    }
}
