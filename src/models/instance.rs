//! Instance (edition/format group) of a work

use serde::{Deserialize, Serialize};

use super::{Agent, DataObject, Date, Format, Identifier, Link, Measurement, Subject};

/// One manifestation of a work, built from a single catalog record and
/// mutated in place by every mapping step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceRecord {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub alt_titles: Vec<String>,
    pub language: Option<String>,
    pub pub_place: Option<String>,
    pub edition_statement: Option<String>,
    pub extent: Option<String>,
    pub table_of_contents: Option<String>,
    pub series: Option<String>,
    pub series_position: Option<String>,
    pub agents: Vec<Agent>,
    pub identifiers: Vec<Identifier>,
    pub formats: Vec<Format>,
    pub measurements: Vec<Measurement>,
    pub subjects: Vec<Subject>,
    pub links: Vec<Link>,
    pub dates: Vec<Date>,
}

impl InstanceRecord {
    pub fn new(title: Option<String>, language: Option<String>) -> Self {
        Self {
            title,
            language,
            ..Self::default()
        }
    }

    pub fn add_identifier(&mut self, identifier: Identifier) {
        self.identifiers.push(identifier);
    }

    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.push(subject);
    }

    pub fn add_format(&mut self, format: Format) {
        self.formats.push(format);
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn add_date(&mut self, date: Date) {
        self.dates.push(date);
    }

    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    /// First identifier of the given scheme
    pub fn identifier(&self, id_type: &str) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|i| i.id_type == id_type)
            .map(|i| i.identifier.as_str())
    }
}

impl DataObject for InstanceRecord {}
