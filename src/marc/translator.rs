//! MARC to InstanceRecord translator
//!
//! Translates a MARC21 catalog record into an [`InstanceRecord`]: control
//! fields first, then the declarative rule tables, subjects, electronic
//! holdings and finally (optionally) name authority enrichment.

use std::sync::Arc;

use super::mapping::{apply_rules, Attribute, MappingRule};
use super::parser::MarcRecord;
use super::subjects::{extract_subjects, SUBJECT_TAGS};
use super::TaggedRecord;
use crate::{
    holdings::HoldingsResolver,
    models::{
        measurement::{upsert_date, PUB_DATE},
        Identifier, InstanceRecord,
    },
    services::{agents::enrich_agents, lookup::AgentLookup},
};

/// 0XX control numbers, `$a` before `$z` (cancelled/invalid numbers)
pub const IDENTIFIER_RULES: [MappingRule; 10] = [
    MappingRule::new("010", Attribute::Identifiers("lccn"), 'a'),
    MappingRule::new("020", Attribute::Identifiers("isbn"), 'a'),
    MappingRule::new("022", Attribute::Identifiers("issn"), 'a'),
    MappingRule::new("050", Attribute::Identifiers("lcc"), 'a'),
    MappingRule::new("082", Attribute::Identifiers("ddc"), 'a'),
    MappingRule::new("010", Attribute::Identifiers("lccn"), 'z'),
    MappingRule::new("020", Attribute::Identifiers("isbn"), 'z'),
    MappingRule::new("022", Attribute::Identifiers("issn"), 'z'),
    MappingRule::new("050", Attribute::Identifiers("lcc"), 'z'),
    MappingRule::new("082", Attribute::Identifiers("ddc"), 'z'),
];

pub const TITLE_RULES: [MappingRule; 7] = [
    MappingRule::new("210", Attribute::AltTitles, 'a'),
    MappingRule::new("222", Attribute::AltTitles, 'a'),
    MappingRule::new("242", Attribute::AltTitles, 'a'),
    MappingRule::new("246", Attribute::AltTitles, 'a'),
    MappingRule::new("247", Attribute::AltTitles, 'a'),
    MappingRule::new("245", Attribute::Title, 'a'),
    MappingRule::new("245", Attribute::SubTitle, 'b'),
];

pub const EDITION_RULES: [MappingRule; 7] = [
    MappingRule::new("250", Attribute::EditionStatement, 'a'),
    MappingRule::new("250", Attribute::EditionStatement, 'b'),
    MappingRule::new("260", Attribute::PubPlace, 'a'),
    MappingRule::new("260", Attribute::PubDate, 'c'),
    MappingRule::new("260", Attribute::Agents("publisher"), 'b'),
    MappingRule::new("260", Attribute::Agents("manufacturer"), 'f'),
    MappingRule::new("264", Attribute::CopyrightDate, 'c'),
];

pub const EXTENT_RULES: [MappingRule; 5] = [
    MappingRule::new("300", Attribute::Extent, 'a'),
    MappingRule::new("300", Attribute::Extent, 'b'),
    MappingRule::new("300", Attribute::Extent, 'c'),
    MappingRule::new("300", Attribute::Extent, 'e'),
    MappingRule::new("300", Attribute::Extent, 'f'),
];

pub const SERIES_RULES: [MappingRule; 2] = [
    MappingRule::new("490", Attribute::Series, 'a'),
    MappingRule::new("490", Attribute::SeriesPosition, 'v'),
];

pub const TOC_RULES: [MappingRule; 1] = [MappingRule::new("505", Attribute::TableOfContents, 'a')];

/// Values read from the fixed-length 008 control field
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixedFields {
    pub language: Option<String>,
    pub pub_year: Option<String>,
}

/// Language code at positions 35-37, first publication date at 07-10
pub fn parse_008(value: &str) -> FixedFields {
    let slice = |range: std::ops::Range<usize>| {
        value
            .get(range)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };
    FixedFields {
        language: slice(35..38),
        pub_year: slice(7..11),
    }
}

/// Append the `$a` codes of the first 041 to the language, `;` separated
pub fn apply_languages(record: &MarcRecord, instance: &mut InstanceRecord) {
    let Some(field) = record.get_fields("041").into_iter().next() else {
        return;
    };

    for code in field.get_all_subfields('a') {
        match instance.language.as_mut() {
            Some(language) => {
                language.push(';');
                language.push_str(code);
            }
            None => instance.language = Some(code.to_string()),
        }
    }
}

/// MARC record translator
#[derive(Clone)]
pub struct MarcTranslator {
    holdings: HoldingsResolver,
    agents: Option<Arc<dyn AgentLookup>>,
}

impl MarcTranslator {
    pub fn new(holdings: HoldingsResolver) -> Self {
        Self { holdings, agents: None }
    }

    /// Enable name authority lookups for every translated agent
    pub fn with_agent_lookup(mut self, lookup: Arc<dyn AgentLookup>) -> Self {
        self.agents = Some(lookup);
        self
    }

    /// Translate a catalog record into an instance
    pub async fn translate(&self, record: &MarcRecord) -> InstanceRecord {
        tracing::debug!("Parsing returned edition");
        let mut instance = InstanceRecord::default();

        match record.control_field("001") {
            Some(number) => instance.add_identifier(Identifier::authoritative("oclc", number.trim())),
            None => tracing::warn!("Record has no 001 control number"),
        }

        let fixed = match record.control_field("008") {
            Some(value) => parse_008(value),
            None => {
                tracing::warn!("Record has no 008 control field");
                FixedFields::default()
            }
        };
        if fixed.language.is_none() {
            tracing::debug!("No language code in 008 field");
        }
        instance.language = fixed.language.clone();

        tracing::debug!("Parsing 0X0-0XX fields");
        apply_rules(record, &mut instance, &IDENTIFIER_RULES);

        apply_languages(record, &mut instance);

        tracing::debug!("Parsing 21X-24X fields");
        apply_rules(record, &mut instance, &TITLE_RULES);

        tracing::debug!("Parsing edition (250 & 260) fields");
        apply_rules(record, &mut instance, &EDITION_RULES);

        if let Some(year) = fixed.pub_year.as_deref() {
            upsert_date(&mut instance.dates, PUB_DATE, year);
        }

        tracing::debug!("Parsing extent, series and TOC fields");
        apply_rules(record, &mut instance, &EXTENT_RULES);
        apply_rules(record, &mut instance, &SERIES_RULES);
        apply_rules(record, &mut instance, &TOC_RULES);

        tracing::debug!("Parsing 6XX subject fields");
        for tag in SUBJECT_TAGS {
            extract_subjects(record, &mut instance, tag);
        }

        tracing::debug!("Parsing 856 (electronic holding) fields");
        self.holdings.extract_holdings(record, &mut instance).await;

        if let Some(lookup) = &self.agents {
            let enriched = enrich_agents(lookup.as_ref(), &mut instance.agents).await;
            tracing::debug!("Enriched {} of {} agents", enriched, instance.agents.len());
        }

        instance
    }
}
