//! Configuration management for the catalog enhancer

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Catalog (MARCXML) lookup endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub retry_timeout_secs: u64,
}

/// Collaborator endpoints used while resolving holdings and agents.
/// `{}` in a URL template is replaced by the looked-up key.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub agent_lookup_url: Option<String>,
    pub hathi_volumes_url: String,
    pub hathi_download_url: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // ENHANCER_CATALOG__API_KEY, ENHANCER_LOGGING__LEVEL, ...
            .add_source(
                Environment::with_prefix("ENHANCER")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("catalog.api_key", env::var("OCLC_KEY").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: "http://www.worldcat.org/webservices/catalog/content".to_string(),
            api_key: String::new(),
            timeout_secs: 2,
            retry_timeout_secs: 5,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            agent_lookup_url: None,
            hathi_volumes_url: "http://catalog.hathitrust.org/api/volumes/full/{}.json".to_string(),
            hathi_download_url: "babel.hathitrust.org/cgi/imgsrv/download/pdf?id={}".to_string(),
            user_agent: concat!("catalog-enhancer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
