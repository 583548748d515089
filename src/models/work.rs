//! Work record

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::merge_agents;
use super::{Agent, DataObject, Date, Identifier, InstanceRecord, Link, Measurement, Subject};

/// A bibliographic work and every instance found for it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkRecord {
    pub uuid: Option<Uuid>,
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub alt_titles: Vec<String>,
    pub sort_title: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub rights_statement: Option<String>,
    pub medium: Option<String>,
    pub series: Option<String>,
    pub series_position: Option<String>,
    pub primary_identifier: Option<Identifier>,
    pub identifiers: Vec<Identifier>,
    pub instances: Vec<InstanceRecord>,
    pub subjects: Vec<Subject>,
    pub agents: Vec<Agent>,
    pub links: Vec<Link>,
    pub measurements: Vec<Measurement>,
    pub dates: Vec<Date>,
}

impl WorkRecord {
    pub fn new() -> Self {
        Self {
            uuid: Some(Uuid::new_v4()),
            ..Self::default()
        }
    }

    pub fn add_identifier(&mut self, identifier: Identifier) {
        self.identifiers.push(identifier);
    }

    pub fn add_instance(&mut self, instance: InstanceRecord) {
        self.instances.push(instance);
    }

    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.push(subject);
    }

    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    pub fn add_measurement(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    pub fn add_date(&mut self, date: Date) {
        self.dates.push(date);
    }

    /// Replace the work's agents with the deduplicated union of `new_agents`
    /// and the agents already attached to the work
    pub fn merge_agents(&mut self, new_agents: Vec<Agent>) {
        let existing = std::mem::take(&mut self.agents);
        self.agents = merge_agents(new_agents, existing).into_values().collect();
    }
}

impl DataObject for WorkRecord {}
