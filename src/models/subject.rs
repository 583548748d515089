//! Subject model

use serde::{Deserialize, Serialize};

use super::{DataObject, Measurement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Controlled vocabulary code (lcsh, fast, ...), if known
    #[serde(default)]
    pub authority: Option<String>,
    /// Composite display string, e.g. "Cats -- History"
    pub subject: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl Subject {
    pub fn new(authority: Option<String>, subject: impl Into<String>) -> Self {
        Self {
            authority,
            subject: subject.into(),
            uri: None,
            weight: None,
            measurements: Vec::new(),
        }
    }

    pub fn add_measurement(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }
}

impl DataObject for Subject {}
