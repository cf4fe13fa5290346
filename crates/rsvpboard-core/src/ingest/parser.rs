//! Raw row -> `GuestRecord` conversion.
//!
//! Two header schemes are in circulation:
//!
//! - the RSVP export: `First Name`, `Last Name`, one column per event named
//!   after the event, `Side` holding the relationship label and
//!   `Bride_or_Groom` holding the group;
//! - the guest scraper: `First_Name`, `Last_Name`, `RSVP_<Event>` columns,
//!   `Relationship` holding the relationship label and `Side` holding the
//!   group.
//!
//! Parsing never fails. Missing or malformed cells degrade to an empty
//! string, `Group::Unknown` or `RsvpStatus::NoResponse`.

use crate::models::{EventSet, Group, GuestRecord, RsvpStatus};

use super::columns::RawRow;

pub const TITLE_HEADERS: &[&str] = &["Title"];
pub const FIRST_NAME_HEADERS: &[&str] = &["First Name", "First_Name"];
pub const LAST_NAME_HEADERS: &[&str] = &["Last Name", "Last_Name"];
pub const SUFFIX_HEADERS: &[&str] = &["Suffix"];

/// Relationship label. Exact `Relationship` (scraper) is preferred over the
/// export's `Side`.
pub const SIDE_HEADERS: &[&str] = &["Relationship", "Relationship To Couple", "Side"];

/// Direct Bride/Groom column.
pub const GROUP_HEADERS: &[&str] = &["Bride_or_Groom", "Group"];

/// The scraper writes the group into `Side`.
pub const LEGACY_GROUP_HEADERS: &[&str] = &["Side"];

pub const EMAIL_HEADERS: &[&str] = &["Email", "Email Address"];
pub const PHONE_HEADERS: &[&str] = &["Phone", "Phone Number"];
/// Resolved with the email column excluded, so a lone `Email Address`
/// header never doubles as the postal address.
pub const ADDRESS_HEADERS: &[&str] = &["Address", "Mailing Address"];

/// Parse one raw row into a canonical record with one status per event in
/// `events`.
pub fn parse_guest(row: &RawRow, events: &EventSet) -> GuestRecord {
    let rsvp = events
        .events()
        .iter()
        .map(|event| RsvpStatus::from_raw(row.resolve(&event.patterns())))
        .collect();

    let email_column = row.position(EMAIL_HEADERS);

    GuestRecord {
        title: row.resolve(TITLE_HEADERS).to_string(),
        first_name: row.resolve(FIRST_NAME_HEADERS).to_string(),
        last_name: row.resolve(LAST_NAME_HEADERS).to_string(),
        suffix: row.resolve(SUFFIX_HEADERS).to_string(),
        side: row.resolve(SIDE_HEADERS).to_string(),
        group: parse_group(row),
        rsvp,
        email: row.value_at(email_column).to_string(),
        phone: row.resolve(PHONE_HEADERS).to_string(),
        address: row
            .resolve_excluding(ADDRESS_HEADERS, email_column)
            .to_string(),
    }
}

/// The direct group column wins when it has a value; otherwise the legacy
/// column is consulted.
fn parse_group(row: &RawRow) -> Group {
    let direct = row.resolve(GROUP_HEADERS);
    if !direct.trim().is_empty() {
        return Group::from_raw(direct);
    }
    Group::from_raw(row.resolve(LEGACY_GROUP_HEADERS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_parse_export_scheme() {
        let events = EventSet::default();
        let r = row(&[
            ("Title", "Dr."),
            ("First Name", "Asha"),
            ("Last Name", "Patel"),
            ("Suffix", ""),
            ("Saumya's Vidhi & Haaldi", "Attending"),
            ("Mahek's Vidhi & Haaldi", "Not Invited"),
            ("Wedding", "Attending"),
            ("Reception", "Declined"),
            ("Side", "Saumya's Family"),
            ("Bride_or_Groom", "Bride"),
        ]);

        let guest = parse_guest(&r, &events);
        assert_eq!(guest.title, "Dr.");
        assert_eq!(guest.first_name, "Asha");
        assert_eq!(guest.last_name, "Patel");
        assert_eq!(guest.side, "Saumya's Family");
        assert_eq!(guest.group, Group::Bride);
        assert_eq!(
            guest.rsvp,
            vec![
                RsvpStatus::Attending,
                RsvpStatus::NotInvited,
                RsvpStatus::Attending,
                RsvpStatus::Declined,
            ]
        );
    }

    #[test]
    fn test_parse_scraper_scheme() {
        let events = EventSet::default();
        let r = row(&[
            ("Household_Index", "12"),
            ("First_Name", "Ravi"),
            ("Last_Name", "Shah"),
            ("Full_Name", "Ravi Shah"),
            ("Guest_Of", ""),
            ("Relationship", "Mahek's Friend"),
            ("Side", "Groom"),
            ("RSVP_Maheks_Vidhi_and_Haaldi", "Declined"),
            ("RSVP_Saumyas_Vidhi_and_Haaldi", ""),
            ("RSVP_Wedding", "Attending"),
            ("RSVP_Reception", "No Response"),
        ]);

        let guest = parse_guest(&r, &events);
        assert_eq!(guest.first_name, "Ravi");
        assert_eq!(guest.last_name, "Shah");
        assert_eq!(guest.side, "Mahek's Friend");
        assert_eq!(guest.group, Group::Groom);
        assert_eq!(
            guest.rsvp,
            vec![
                RsvpStatus::NoResponse,
                RsvpStatus::Declined,
                RsvpStatus::Attending,
                RsvpStatus::NoResponse,
            ]
        );
    }

    #[test]
    fn test_missing_status_columns_are_no_response() {
        let events = EventSet::default();
        let guest = parse_guest(&row(&[("First Name", "Asha")]), &events);
        assert_eq!(guest.rsvp, vec![RsvpStatus::NoResponse; 4]);
        assert_eq!(guest.group, Group::Unknown);
        assert_eq!(guest.side, "");
        assert_eq!(guest.email, "");
    }

    #[test]
    fn test_not_invited_requires_exact_spelling() {
        let events = EventSet::default();
        let guest = parse_guest(
            &row(&[("Wedding", " Not Invited "), ("Reception", "not invited")]),
            &events,
        );
        assert_eq!(guest.status(2), RsvpStatus::NotInvited);
        assert_eq!(guest.status(3), RsvpStatus::NoResponse);
    }

    #[test]
    fn test_blank_direct_group_falls_back_to_legacy_column() {
        let r = row(&[("Bride_or_Groom", ""), ("Side", "Bride")]);
        assert_eq!(parse_group(&r), Group::Bride);

        let r = row(&[("Bride_or_Groom", "Groom"), ("Side", "Bride")]);
        assert_eq!(parse_group(&r), Group::Groom);
    }

    #[test]
    fn test_unrecognized_group_is_unknown() {
        let r = row(&[("Bride_or_Groom", "Both")]);
        assert_eq!(parse_group(&r), Group::Unknown);
    }

    #[test]
    fn test_contact_fields() {
        let events = EventSet::default();
        let guest = parse_guest(
            &row(&[
                ("First Name", "Asha"),
                ("Email Address", "asha@example.com"),
                ("Phone", "555-123-4567"),
                ("Mailing Address", "1 Main St"),
            ]),
            &events,
        );
        assert_eq!(guest.email, "asha@example.com");
        assert_eq!(guest.phone, "555-123-4567");
        assert_eq!(guest.address, "1 Main St");
    }

    #[test]
    fn test_email_address_column_is_not_the_postal_address() {
        let events = EventSet::default();
        let guest = parse_guest(
            &row(&[("First Name", "Asha"), ("Email Address", "asha@example.com")]),
            &events,
        );
        assert_eq!(guest.email, "asha@example.com");
        assert_eq!(guest.address, "");

        let guest = parse_guest(
            &row(&[
                ("Email Address", "asha@example.com"),
                ("Street Address", "1 Main St"),
            ]),
            &events,
        );
        assert_eq!(guest.email, "asha@example.com");
        assert_eq!(guest.address, "1 Main St");
    }

    #[test]
    fn test_names_are_not_normalized() {
        let events = EventSet::default();
        let guest = parse_guest(&row(&[("First Name", " asha ")]), &events);
        assert_eq!(guest.first_name, " asha ");
    }
}
