//! Measurement and date records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DataObject;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub quantity: String,
    pub value: f64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_id: Option<String>,
}

impl Measurement {
    pub fn new(quantity: impl Into<String>, value: f64) -> Self {
        Self {
            quantity: quantity.into(),
            value,
            weight: None,
            taken_at: None,
            source_id: None,
        }
    }

    /// Value of the first measurement of `quantity`
    pub fn value_for(measurements: &[Measurement], quantity: &str) -> Option<f64> {
        measurements
            .iter()
            .find(|m| m.quantity == quantity)
            .map(|m| m.value)
    }
}

impl DataObject for Measurement {}

/// Date kinds written by the MARC mapping
pub const PUB_DATE: &str = "pub_date";
pub const COPYRIGHT_DATE: &str = "copyright_date";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Date {
    #[serde(default)]
    pub display_date: Option<String>,
    #[serde(default)]
    pub date_range: Option<String>,
    pub date_type: String,
}

impl Date {
    pub fn new(display_date: impl Into<String>, date_range: impl Into<String>, date_type: impl Into<String>) -> Self {
        Self {
            display_date: Some(display_date.into()),
            date_range: Some(date_range.into()),
            date_type: date_type.into(),
        }
    }
}

impl DataObject for Date {}

/// Insert a date of `date_type`, or overwrite the range of the existing one
pub fn upsert_date(dates: &mut Vec<Date>, date_type: &str, value: &str) {
    match dates.iter_mut().find(|d| d.date_type == date_type) {
        Some(existing) => existing.date_range = Some(value.to_string()),
        None => dates.push(Date::new(value, value, date_type)),
    }
}
