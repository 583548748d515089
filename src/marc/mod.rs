//! MARC record parsing and translation
//!
//! This module provides the tagged-record capability consumed by the mapping
//! pipeline, a MARC21 parser implementing it, and the translation of a
//! catalog record into an `InstanceRecord`.

pub mod mapping;
pub mod parser;
pub mod subjects;
pub mod translator;

pub use mapping::{Attribute, MappingRule, MappingTarget};
pub use parser::{DataField, MarcRecord, Subfield};
pub use translator::MarcTranslator;

/// A field of a tagged bibliographic record
pub trait TaggedField {
    fn tag(&self) -> &str;
    fn ind1(&self) -> char;
    fn ind2(&self) -> char;
    /// First value of subfield `code`, if present
    fn subfield(&self, code: char) -> Option<&str>;
}

/// A bibliographic record exposing its fields by tag
pub trait TaggedRecord {
    type Field: TaggedField + Sync;

    /// Every instance of `tag`, in record order
    fn fields(&self, tag: &str) -> Vec<&Self::Field>;

    fn control_field(&self, tag: &str) -> Option<&str>;
}
