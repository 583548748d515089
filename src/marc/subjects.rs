//! Subject heading extraction (6XX fields)

use super::{TaggedField, TaggedRecord};
use crate::models::{InstanceRecord, Subject};

/// Subject tags read from a catalog record, in extraction order
pub const SUBJECT_TAGS: [&str; 8] = ["600", "610", "648", "650", "651", "655", "656", "657"];

/// Subdivision subfields, in display order
const SUBDIVISION_CODES: [char; 4] = ['v', 'x', 'y', 'z'];

/// Vocabulary named by the second indicator ('7' defers to $2)
fn indicator_authority(ind2: char) -> Result<Option<&'static str>, char> {
    match ind2 {
        '0' => Ok(Some("lcsh")),
        '1' => Ok(Some("lcch")),
        '2' => Ok(Some("msh")),
        '3' => Ok(Some("nalsaf")),
        '4' => Ok(None),
        '5' => Ok(Some("csh")),
        '6' => Ok(Some("rvm")),
        other => Err(other),
    }
}

/// Heading subfields for a subject tag
fn heading_codes(tag: &str) -> &'static [char] {
    match tag {
        "600" => &['a', 'b', 'c', 'd', 'q'],
        "610" | "650" => &['a', 'b', 'c', 'd'],
        "655" => &['a', 'b', 'c'],
        _ => &['a'],
    }
}

/// Join heading parts with ", " and subdivisions with " -- "
pub fn compose_subject(heading: &[&str], subdivisions: &[&str]) -> String {
    let heading = heading.join(", ");
    if subdivisions.is_empty() {
        heading
    } else {
        format!("{} -- {}", heading, subdivisions.join(" -- "))
    }
}

/// Build the subject for one field instance
pub fn parse_subject<F: TaggedField + ?Sized>(field: &F) -> Subject {
    let heading: Vec<&str> = heading_codes(field.tag())
        .iter()
        .filter_map(|&code| field.subfield(code))
        .collect();
    let subdivisions: Vec<&str> = SUBDIVISION_CODES
        .iter()
        .filter_map(|&code| field.subfield(code))
        .collect();

    let authority = if field.ind2() == '7' {
        field.subfield('2').map(String::from)
    } else {
        match indicator_authority(field.ind2()) {
            Ok(authority) => authority.map(String::from),
            Err(code) => {
                tracing::error!("Unknown subject authority indicator '{}' on field {}", code, field.tag());
                None
            }
        }
    };

    let mut subject = Subject::new(authority, compose_subject(&heading, &subdivisions));
    subject.uri = field.subfield('0').map(String::from);
    subject
}

/// Append a subject for every instance of `tag`. Repeated headings are kept.
pub fn extract_subjects<R: TaggedRecord + ?Sized>(record: &R, instance: &mut InstanceRecord, tag: &str) {
    for field in record.fields(tag) {
        instance.add_subject(parse_subject(field));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marc::{DataField, MarcRecord};

    #[test]
    fn test_compose_subject() {
        assert_eq!(compose_subject(&["Cats"], &["History"]), "Cats -- History");
        assert_eq!(compose_subject(&["Cats", "Domestic"], &[]), "Cats, Domestic");
        assert_eq!(
            compose_subject(&["Whaling"], &["Fiction", "19th century"]),
            "Whaling -- Fiction -- 19th century"
        );
    }

    #[test]
    fn test_personal_name_heading() {
        let field = DataField::new(
            "600",
            '1',
            '0',
            &[('a', "Melville, Herman"), ('d', "1819-1891"), ('v', "Correspondence"), ('x', "Biography")],
        );
        let subject = parse_subject(&field);
        assert_eq!(subject.subject, "Melville, Herman, 1819-1891 -- Correspondence -- Biography");
        assert_eq!(subject.authority.as_deref(), Some("lcsh"));
    }

    #[test]
    fn test_subdivisions_follow_fixed_order() {
        let field = DataField::new("651", ' ', '0', &[('z', "Nantucket"), ('a', "Massachusetts"), ('y', "1800s"), ('x', "History")]);
        assert_eq!(parse_subject(&field).subject, "Massachusetts -- History -- 1800s -- Nantucket");
    }

    #[test]
    fn test_genre_heading_ignores_d() {
        let field = DataField::new("655", ' ', '7', &[('a', "Sea stories"), ('d', "ignored"), ('2', "gsafd")]);
        let subject = parse_subject(&field);
        assert_eq!(subject.subject, "Sea stories");
        assert_eq!(subject.authority.as_deref(), Some("gsafd"));
    }

    #[test]
    fn test_indicator_seven_without_source() {
        let field = DataField::new("650", ' ', '7', &[('a', "Whales")]);
        assert!(parse_subject(&field).authority.is_none());
    }

    #[test]
    fn test_unknown_indicator_leaves_authority_empty() {
        let field = DataField::new("650", ' ', '9', &[('a', "Whales"), ('2', "fast")]);
        let subject = parse_subject(&field);
        assert!(subject.authority.is_none());
        assert_eq!(subject.subject, "Whales");
    }

    #[test]
    fn test_subject_uri() {
        let field = DataField::new(
            "650",
            ' ',
            '7',
            &[('a', "Whaling"), ('2', "fast"), ('0', "http://id.worldcat.org/fast/1172036")],
        );
        let subject = parse_subject(&field);
        assert_eq!(subject.uri.as_deref(), Some("http://id.worldcat.org/fast/1172036"));
    }

    #[test]
    fn test_repeated_headings_are_not_merged() {
        let record = MarcRecord::new()
            .with_field(DataField::new("650", ' ', '0', &[('a', "Whales")]))
            .with_field(DataField::new("650", ' ', '0', &[('a', "Whales")]));
        let mut instance = InstanceRecord::default();
        extract_subjects(&record, &mut instance, "650");
        assert_eq!(instance.subjects.len(), 2);
    }
}
