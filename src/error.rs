//! Error types for the catalog enhancer

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A single MARC field could not be used (missing subfield, wrong indicator).
    /// Always recoverable: the field is skipped and processing continues.
    #[error("Field error: {0}")]
    Field(String),

    /// A collaborator endpoint answered with a non-200 status or an unusable body
    #[error("Upstream lookup error: {0}")]
    Upstream(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// HTTP-style status code used in the binary's response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidRequest(_) => 400,
            AppError::Catalog(_) | AppError::Upstream(_) | AppError::Http(_) => 502,
            AppError::Field(_) | AppError::Json(_) | AppError::Config(_) => 500,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(AppError::Catalog("x".into()).status_code(), 502);
        assert_eq!(AppError::Field("x".into()).status_code(), 500);
    }
}
