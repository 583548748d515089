//! Declarative field/subfield to attribute mapping
//!
//! A [`MappingRule`] names a tag, a subfield code and the attribute the value
//! is written to. Rules are applied to every instance of the tag; instances
//! lacking the subfield are skipped.

use super::{TaggedField, TaggedRecord};
use crate::models::measurement::{upsert_date, COPYRIGHT_DATE, PUB_DATE};
use crate::models::{Agent, Date, Identifier, InstanceRecord, WorkRecord};

/// Destination of a mapped value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Title,
    SubTitle,
    AltTitles,
    PubPlace,
    EditionStatement,
    Extent,
    TableOfContents,
    Series,
    SeriesPosition,
    /// New agent with the given role
    Agents(&'static str),
    /// New identifier of the given scheme
    Identifiers(&'static str),
    PubDate,
    CopyrightDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRule {
    pub tag: &'static str,
    pub attribute: Attribute,
    pub code: char,
}

impl MappingRule {
    pub const fn new(tag: &'static str, attribute: Attribute, code: char) -> Self {
        Self { tag, attribute, code }
    }
}

/// Storage behind a descriptive attribute. Scalars concatenate repeated
/// values with "; ", lists append.
pub enum Slot<'a> {
    Scalar(&'a mut Option<String>),
    List(&'a mut Vec<String>),
}

/// A record the mapping engine can write into
pub trait MappingTarget {
    /// Storage for a descriptive attribute, `None` if the record has no such attribute
    fn slot(&mut self, attribute: Attribute) -> Option<Slot<'_>>;
    fn agents_mut(&mut self) -> &mut Vec<Agent>;
    fn identifiers_mut(&mut self) -> &mut Vec<Identifier>;
    fn dates_mut(&mut self) -> &mut Vec<Date>;
}

/// Apply one rule to every instance of its tag. Returns the number of field
/// instances that produced a value.
pub fn apply_rule<R, T>(record: &R, target: &mut T, rule: &MappingRule) -> usize
where
    R: TaggedRecord + ?Sized,
    T: MappingTarget + ?Sized,
{
    let mut applied = 0;
    for field in record.fields(rule.tag) {
        let Some(value) = field.subfield(rule.code) else {
            tracing::debug!("Could not load subfield {} for field {}", rule.code, rule.tag);
            continue;
        };
        apply_value(target, rule.attribute, value);
        applied += 1;
    }
    applied
}

/// Apply a table of rules in order
pub fn apply_rules<R, T>(record: &R, target: &mut T, rules: &[MappingRule]) -> usize
where
    R: TaggedRecord + ?Sized,
    T: MappingTarget + ?Sized,
{
    rules.iter().map(|rule| apply_rule(record, target, rule)).sum()
}

fn apply_value<T: MappingTarget + ?Sized>(target: &mut T, attribute: Attribute, value: &str) {
    match attribute {
        Attribute::Agents(role) => target.agents_mut().push(Agent::with_role(value, role)),
        Attribute::Identifiers(scheme) => target
            .identifiers_mut()
            .push(Identifier::authoritative(scheme, value.trim())),
        Attribute::PubDate => upsert_date(target.dates_mut(), PUB_DATE, value),
        Attribute::CopyrightDate => upsert_date(target.dates_mut(), COPYRIGHT_DATE, value),
        descriptive => match target.slot(descriptive) {
            Some(Slot::Scalar(slot)) => match slot {
                Some(existing) => {
                    existing.push_str("; ");
                    existing.push_str(value);
                }
                None => *slot = Some(value.to_string()),
            },
            Some(Slot::List(list)) => list.push(value.to_string()),
            None => tracing::warn!("Attribute {:?} is not supported by this record", descriptive),
        },
    }
}

impl MappingTarget for InstanceRecord {
    fn slot(&mut self, attribute: Attribute) -> Option<Slot<'_>> {
        Some(match attribute {
            Attribute::Title => Slot::Scalar(&mut self.title),
            Attribute::SubTitle => Slot::Scalar(&mut self.sub_title),
            Attribute::AltTitles => Slot::List(&mut self.alt_titles),
            Attribute::PubPlace => Slot::Scalar(&mut self.pub_place),
            Attribute::EditionStatement => Slot::Scalar(&mut self.edition_statement),
            Attribute::Extent => Slot::Scalar(&mut self.extent),
            Attribute::TableOfContents => Slot::Scalar(&mut self.table_of_contents),
            Attribute::Series => Slot::Scalar(&mut self.series),
            Attribute::SeriesPosition => Slot::Scalar(&mut self.series_position),
            _ => return None,
        })
    }

    fn agents_mut(&mut self) -> &mut Vec<Agent> {
        &mut self.agents
    }

    fn identifiers_mut(&mut self) -> &mut Vec<Identifier> {
        &mut self.identifiers
    }

    fn dates_mut(&mut self) -> &mut Vec<Date> {
        &mut self.dates
    }
}

impl MappingTarget for WorkRecord {
    fn slot(&mut self, attribute: Attribute) -> Option<Slot<'_>> {
        Some(match attribute {
            Attribute::Title => Slot::Scalar(&mut self.title),
            Attribute::SubTitle => Slot::Scalar(&mut self.sub_title),
            Attribute::AltTitles => Slot::List(&mut self.alt_titles),
            Attribute::Series => Slot::Scalar(&mut self.series),
            Attribute::SeriesPosition => Slot::Scalar(&mut self.series_position),
            _ => return None,
        })
    }

    fn agents_mut(&mut self) -> &mut Vec<Agent> {
        &mut self.agents
    }

    fn identifiers_mut(&mut self) -> &mut Vec<Identifier> {
        &mut self.identifiers
    }

    fn dates_mut(&mut self) -> &mut Vec<Date> {
        &mut self.dates
    }
}
