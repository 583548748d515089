//! Identifier model

use serde::{Deserialize, Serialize};

use super::DataObject;

/// Weight of an identifier read from a dedicated control field
pub const AUTHORITATIVE_WEIGHT: f64 = 1.0;
/// Weight of an identifier recovered from a holdings URI
pub const URI_WEIGHT: f64 = 0.8;

/// Identifier under a classification scheme ("oclc", "isbn", "lccn", "hathi", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub id_type: String,
    pub identifier: String,
    pub weight: f64,
}

impl Identifier {
    pub fn new(id_type: impl Into<String>, identifier: impl Into<String>, weight: f64) -> Self {
        Self {
            id_type: id_type.into(),
            identifier: identifier.into(),
            weight,
        }
    }

    pub fn authoritative(id_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::new(id_type, identifier, AUTHORITATIVE_WEIGHT)
    }
}

impl DataObject for Identifier {}
