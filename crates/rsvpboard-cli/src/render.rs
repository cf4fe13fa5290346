//! Plain-text rendering of dashboard views.

use std::fmt::Write;

use rsvpboard_core::retry::FailureLog;
use rsvpboard_core::stats::{duplicate_names, DuplicateName};
use rsvpboard_core::utils::{format_phone, truncate_string};
use rsvpboard_core::{EventSet, GuestRecord, SummaryStats};

/// Width of the name column in guest listings.
const NAME_WIDTH: usize = 28;

/// Width of the side column in guest listings.
const SIDE_WIDTH: usize = 24;

/// Width of the event column in the summary table.
const EVENT_WIDTH: usize = 26;

/// Maximum number of sides shown in the summary.
const MAX_SIDES_SHOWN: usize = 15;

// ============================================================================
// Summary
// ============================================================================

pub fn summary(
    stats: &SummaryStats,
    guests: &[&GuestRecord],
    header: Option<&str>,
) -> String {
    let mut out = String::new();

    if let Some(header) = header {
        let _ = writeln!(out, "{}\n", header);
    }

    let _ = writeln!(
        out,
        "Guests: {}  (Bride {} | Groom {} | Unknown {})",
        stats.groups.headline_total(),
        stats.groups.bride,
        stats.groups.groom,
        stats.groups.unknown,
    );
    if stats.groups.unknown > 0 {
        let _ = writeln!(out, "Total records: {}", stats.total);
    }

    let primary_label = stats
        .primary()
        .map(|p| p.label.as_str())
        .unwrap_or(stats.primary_event.as_str());
    let _ = writeln!(
        out,
        "Response rate ({}): {:.2}%\n",
        primary_label, stats.response_rate
    );

    let _ = writeln!(
        out,
        "{:<width$} {:>9} {:>8} {:>11} {:>11} {:>6} {:>6}",
        "Event",
        "Attending",
        "Declined",
        "No Response",
        "Not Invited",
        "Bride",
        "Groom",
        width = EVENT_WIDTH,
    );
    for event in &stats.events {
        let _ = writeln!(
            out,
            "{:<width$} {:>9} {:>8} {:>11} {:>11} {:>6} {:>6}",
            truncate_string(&event.label, EVENT_WIDTH),
            event.counts.attending,
            event.counts.declined,
            event.counts.no_response,
            event.counts.not_invited,
            event.attending_by_group.bride,
            event.attending_by_group.groom,
            width = EVENT_WIDTH,
        );
    }

    if !stats.sides.is_empty() {
        let _ = writeln!(out, "\nBy side:");
        for side in stats.sides.iter().take(MAX_SIDES_SHOWN) {
            let label = if side.side.is_empty() {
                "(none)"
            } else {
                side.side.as_str()
            };
            let _ = writeln!(
                out,
                "  {:<width$} {:>5}",
                truncate_string(label, SIDE_WIDTH),
                side.count,
                width = SIDE_WIDTH,
            );
        }
        if stats.sides.len() > MAX_SIDES_SHOWN {
            let _ = writeln!(out, "  ... {} more", stats.sides.len() - MAX_SIDES_SHOWN);
        }
    }

    let duplicates = duplicate_names(guests.iter().copied());
    if !duplicates.is_empty() {
        let _ = writeln!(out, "\nShared names:");
        for dup in &duplicates {
            let _ = writeln!(out, "  {}", duplicate_line(dup));
        }
    }

    out
}

fn duplicate_line(dup: &DuplicateName) -> String {
    let sides: Vec<&str> = dup
        .sides
        .iter()
        .map(|s| if s.is_empty() { "(none)" } else { s.as_str() })
        .collect();
    format!("{} x{} ({})", dup.name, dup.count, sides.join(", "))
}

// ============================================================================
// Guest list
// ============================================================================

pub fn guest_table(guests: &[&GuestRecord], events: &EventSet, contacts: bool) -> String {
    let mut out = String::new();
    let primary = events.primary_index();

    let _ = writeln!(
        out,
        "{:<name$} {:<side$} {:<6} {:<12}",
        "Name",
        "Side",
        "Group",
        events.primary().label,
        name = NAME_WIDTH,
        side = SIDE_WIDTH,
    );

    for guest in guests {
        let _ = write!(
            out,
            "{:<name$} {:<side$} {:<6} {:<12}",
            truncate_string(&guest.display_name(), NAME_WIDTH),
            truncate_string(&guest.side, SIDE_WIDTH),
            guest.group.label(),
            guest.status(primary).label(),
            name = NAME_WIDTH,
            side = SIDE_WIDTH,
        );
        if contacts && guest.has_contact() {
            let _ = write!(
                out,
                "  {} {} {}",
                guest.email,
                format_phone(&guest.phone),
                guest.address
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "\n{} guest(s)", guests.len());
    out
}

// ============================================================================
// Failure log
// ============================================================================

pub fn failure_log(log: &FailureLog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Run {}: {} guest(s) failed",
        log.timestamp, log.total_failed
    );
    for guest in &log.guests {
        let _ = writeln!(
            out,
            "  [{}] {}: {} (attempts: {})",
            guest.index + 1,
            guest.display_name,
            guest.reason,
            guest.attempts
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsvpboard_core::retry::FailedItem;
    use rsvpboard_core::{summarize, Group, RsvpStatus};

    fn guest(first: &str, last: &str, side: &str, group: Group, wedding: RsvpStatus) -> GuestRecord {
        GuestRecord {
            first_name: first.to_string(),
            last_name: last.to_string(),
            side: side.to_string(),
            group,
            rsvp: vec![RsvpStatus::NotInvited, RsvpStatus::NotInvited, wedding, RsvpStatus::NoResponse],
            ..Default::default()
        }
    }

    fn sample() -> Vec<GuestRecord> {
        vec![
            guest("Asha", "Patel", "Friend", Group::Bride, RsvpStatus::Attending),
            guest("Ravi", "Shah", "Family", Group::Groom, RsvpStatus::Declined),
            guest("Asha", "Patel", "Family", Group::Groom, RsvpStatus::NoResponse),
        ]
    }

    #[test]
    fn test_summary_text() {
        let guests = sample();
        let refs: Vec<&GuestRecord> = guests.iter().collect();
        let stats = summarize(refs.iter().copied(), &EventSet::default());

        let text = summary(&stats, &refs, Some("Source: guests.csv"));
        assert!(text.starts_with("Source: guests.csv\n"));
        assert!(text.contains("Guests: 3  (Bride 1 | Groom 2 | Unknown 0)"));
        assert!(text.contains("Response rate (Wedding): 66.67%"));
        assert!(text.contains("Family"));
        assert!(text.contains("Asha Patel x2 (Friend, Family)"));
        assert!(!text.contains("Total records"));
    }

    #[test]
    fn test_guest_table() {
        let mut guests = sample();
        guests[0].phone = "5551234567".to_string();
        let refs: Vec<&GuestRecord> = guests.iter().collect();

        let text = guest_table(&refs, &EventSet::default(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Name"));
        assert!(lines[0].contains("Wedding"));
        assert!(lines[1].starts_with("Patel, Asha"));
        assert!(lines[1].contains("(555) 123-4567"));
        assert!(lines[2].contains("Declined"));
        assert!(text.ends_with("3 guest(s)\n"));
    }

    #[test]
    fn test_failure_log_text() {
        let log = FailureLog {
            timestamp: "2024-05-01_18-30-00".to_string(),
            total_failed: 1,
            guests: vec![FailedItem {
                index: 4,
                display_name: "Patel, Asha".to_string(),
                reason: "Timeout".to_string(),
                attempts: 5,
            }],
        };
        let text = failure_log(&log);
        assert!(text.contains("1 guest(s) failed"));
        assert!(text.contains("[5] Patel, Asha: Timeout (attempts: 5)"));
    }
}
