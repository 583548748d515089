//! Catalog Enhancer
//!
//! Enriches bibliographic work records with metadata taken from MARC21
//! catalog records: identifiers, titles, publication details, subjects,
//! contributors and electronic holdings (ebooks, digitized volumes, links).

pub mod config;
pub mod error;
pub mod holdings;
pub mod marc;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
