//! Bibliographic record data models

pub mod agent;
pub mod format;
pub mod identifier;
pub mod instance;
pub mod measurement;
pub mod subject;
pub mod work;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::AppResult;

// Re-export commonly used types
pub use agent::Agent;
pub use format::{Format, Link, LinkFlags};
pub use identifier::Identifier;
pub use instance::InstanceRecord;
pub use measurement::{Date, Measurement};
pub use subject::Subject;
pub use work::WorkRecord;

/// Conversion between record entities and plain key/value mappings,
/// used wherever a record crosses a serialization boundary.
pub trait DataObject: Serialize + DeserializeOwned {
    /// Read the entity back as a plain mapping
    fn to_value(&self) -> AppResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Build the entity from named fields; unknown keys are ignored and
    /// missing optional fields take their defaults
    fn from_value(value: Value) -> AppResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
