//! MARC record parser
//!
//! Parses raw MARC data (ISO 2709 or MARCXML) into a structured representation.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{TaggedField, TaggedRecord};
use crate::error::{AppError, AppResult};

/// A MARC record containing leader and fields
#[derive(Debug, Clone, Default)]
pub struct MarcRecord {
    /// The 24-character record leader
    pub leader: String,
    /// Control fields (00X)
    pub control_fields: HashMap<String, String>,
    /// Data fields with indicators and subfields
    pub data_fields: Vec<DataField>,
}

/// A MARC data field (010-999)
#[derive(Debug, Clone)]
pub struct DataField {
    /// Field tag (3 characters)
    pub tag: String,
    /// First indicator
    pub ind1: char,
    /// Second indicator
    pub ind2: char,
    /// Subfields
    pub subfields: Vec<Subfield>,
}

/// A MARC subfield
#[derive(Debug, Clone)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield data
    pub data: String,
}

/// Element whose text content is being read from MARCXML
enum XmlElement {
    Leader,
    Control(String),
    /// The last subfield of the open data field
    Subfield,
    Other,
}

/// Text and CDATA may arrive in several chunks for one element
fn append_text(current: &XmlElement, record: Option<&mut MarcRecord>, field: Option<&mut DataField>, text: &str) {
    match (current, record, field) {
        (XmlElement::Leader, Some(rec), _) => rec.leader.push_str(text),
        (XmlElement::Control(tag), Some(rec), _) => {
            rec.control_fields.entry(tag.clone()).or_default().push_str(text)
        }
        (XmlElement::Subfield, _, Some(f)) => {
            if let Some(sf) = f.subfields.last_mut() {
                sf.data.push_str(text);
            }
        }
        _ => {}
    }
}

impl MarcRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style control field insertion
    pub fn with_control_field(mut self, tag: &str, value: &str) -> Self {
        self.control_fields.insert(tag.to_string(), value.to_string());
        self
    }

    /// Builder-style data field insertion
    pub fn with_field(mut self, field: DataField) -> Self {
        self.data_fields.push(field);
        self
    }

    /// Parse a MARC record from raw bytes (ISO 2709 format)
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 24 {
            return None;
        }

        // Parse leader
        let leader = String::from_utf8_lossy(&data[0..24]).to_string();

        // Get base address of data
        let base_address: usize = String::from_utf8_lossy(&data[12..17])
            .trim()
            .parse()
            .ok()?;
        if base_address <= 24 || base_address > data.len() {
            return None;
        }

        // Parse directory (between leader and record separator)
        let directory_data = &data[24..base_address - 1];
        let mut control_fields = HashMap::new();
        let mut data_fields = Vec::new();

        // Each directory entry is 12 bytes: tag(3) + length(4) + start(5)
        let mut pos = 0;
        while pos + 12 <= directory_data.len() {
            let entry = &directory_data[pos..pos + 12];
            let tag = String::from_utf8_lossy(&entry[0..3]).to_string();
            let length: usize = String::from_utf8_lossy(&entry[3..7]).parse().ok()?;
            let start: usize = String::from_utf8_lossy(&entry[7..12]).parse().ok()?;

            // Get field data, without the field terminator
            let field_start = base_address + start;
            let field_end = field_start + length.saturating_sub(1);

            if length > 0 && field_end <= data.len() {
                let field_data = &data[field_start..field_end];

                if tag.starts_with("00") {
                    control_fields.insert(tag, String::from_utf8_lossy(field_data).to_string());
                } else if let Some(data_field) = Self::parse_data_field(&tag, field_data) {
                    data_fields.push(data_field);
                }
            }

            pos += 12;
        }

        Some(MarcRecord {
            leader,
            control_fields,
            data_fields,
        })
    }

    /// Parse a data field from raw bytes
    fn parse_data_field(tag: &str, data: &[u8]) -> Option<DataField> {
        if data.len() < 2 {
            return None;
        }

        let ind1 = data[0] as char;
        let ind2 = data[1] as char;

        let mut subfields = Vec::new();

        // Subfields are separated by 0x1F (unit separator)
        for part in data[2..].split(|&b| b == 0x1F) {
            if part.is_empty() {
                continue;
            }
            let code = part[0] as char;
            let data = String::from_utf8_lossy(&part[1..]).to_string();
            subfields.push(Subfield { code, data });
        }

        Some(DataField {
            tag: tag.to_string(),
            ind1,
            ind2,
            subfields,
        })
    }

    /// Parse the first `<record>` of a MARCXML document (MARC21 slim schema,
    /// with or without a namespace prefix)
    pub fn from_marcxml(xml: &str) -> AppResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut record: Option<MarcRecord> = None;
        let mut field: Option<DataField> = None;
        let mut current = XmlElement::Other;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"record" => record = Some(MarcRecord::new()),
                    b"leader" => current = XmlElement::Leader,
                    b"controlfield" => {
                        current = XmlElement::Control(attribute(e, b"tag").unwrap_or_default())
                    }
                    b"datafield" => field = Some(DataField::from_xml_start(e)),
                    b"subfield" => {
                        // Empty values still yield a subfield; text is appended as it arrives
                        if let Some(f) = field.as_mut() {
                            f.subfields.push(Subfield::from_xml_start(e));
                        }
                        current = XmlElement::Subfield;
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"datafield" => {
                        if let Some(rec) = record.as_mut() {
                            rec.data_fields.push(DataField::from_xml_start(e));
                        }
                    }
                    b"subfield" => {
                        if let Some(f) = field.as_mut() {
                            f.subfields.push(Subfield::from_xml_start(e));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| AppError::Catalog(format!("Invalid MARCXML text: {}", e)))?;
                    append_text(&current, record.as_mut(), field.as_mut(), &text);
                }
                Ok(Event::CData(ref t)) => {
                    let text = String::from_utf8_lossy(t);
                    append_text(&current, record.as_mut(), field.as_mut(), &text);
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"datafield" => {
                        if let (Some(f), Some(rec)) = (field.take(), record.as_mut()) {
                            rec.data_fields.push(f);
                        }
                    }
                    b"record" => break,
                    _ => current = XmlElement::Other,
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(AppError::Catalog(format!(
                        "Invalid MARCXML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        record.ok_or_else(|| AppError::Catalog("MARCXML document contains no record".to_string()))
    }

    /// Get a subfield value by tag and subfield code
    pub fn get_subfield(&self, tag: &str, code: char) -> Option<&str> {
        self.data_fields
            .iter()
            .filter(|f| f.tag == tag)
            .find_map(|f| f.get_subfield(code))
    }

    /// Get all subfield values for a tag and code
    pub fn get_all_subfields(&self, tag: &str, code: char) -> Vec<&str> {
        self.data_fields
            .iter()
            .filter(|f| f.tag == tag)
            .flat_map(|f| f.get_all_subfields(code))
            .collect()
    }

    /// Get a control field value
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields.get(tag).map(String::as_str)
    }

    /// Get all data fields with a specific tag
    pub fn get_fields(&self, tag: &str) -> Vec<&DataField> {
        self.data_fields.iter().filter(|f| f.tag == tag).collect()
    }
}

impl DataField {
    /// Build a field from `(code, value)` pairs
    pub fn new(tag: &str, ind1: char, ind2: char, subfields: &[(char, &str)]) -> Self {
        Self {
            tag: tag.to_string(),
            ind1,
            ind2,
            subfields: subfields
                .iter()
                .map(|(code, data)| Subfield {
                    code: *code,
                    data: data.to_string(),
                })
                .collect(),
        }
    }

    fn from_xml_start(e: &BytesStart<'_>) -> Self {
        let indicator = |key: &[u8]| {
            attribute(e, key)
                .and_then(|v| v.chars().next())
                .unwrap_or(' ')
        };
        Self {
            tag: attribute(e, b"tag").unwrap_or_default(),
            ind1: indicator(b"ind1"),
            ind2: indicator(b"ind2"),
            subfields: Vec::new(),
        }
    }

    /// Get a subfield value by code
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.data.as_str())
    }

    /// Get all subfield values for a code
    pub fn get_all_subfields(&self, code: char) -> Vec<&str> {
        self.subfields
            .iter()
            .filter(|sf| sf.code == code)
            .map(|sf| sf.data.as_str())
            .collect()
    }
}

impl Subfield {
    fn from_xml_start(e: &BytesStart<'_>) -> Self {
        Self {
            code: attribute(e, b"code")
                .and_then(|c| c.chars().next())
                .unwrap_or(' '),
            data: String::new(),
        }
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

impl TaggedField for DataField {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn ind1(&self) -> char {
        self.ind1
    }

    fn ind2(&self) -> char {
        self.ind2
    }

    fn subfield(&self, code: char) -> Option<&str> {
        self.get_subfield(code)
    }
}

impl TaggedRecord for MarcRecord {
    type Field = DataField;

    fn fields(&self, tag: &str) -> Vec<&DataField> {
        self.get_fields(tag)
    }

    fn control_field(&self, tag: &str) -> Option<&str> {
        self.get_control_field(tag)
    }
}
