//! Catalog record acquisition
//!
//! Records are fetched as MARCXML from the catalog content API and parsed
//! into [`MarcRecord`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    marc::MarcRecord,
};

/// Source of catalog records, keyed by catalog number
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn lookup_record(&self, identifier: &str) -> AppResult<MarcRecord>;
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(client: Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    /// Query URL for one record, API key included
    pub fn record_url(&self, identifier: &str) -> String {
        format!(
            "{}/{}?wskey={}",
            self.config.url.trim_end_matches('/'),
            identifier,
            self.config.api_key
        )
    }

    /// Fetch the raw MARCXML body. A timeout or connection failure is
    /// retried once with the longer timeout.
    pub async fn fetch_marcxml(&self, identifier: &str) -> AppResult<String> {
        let url = self.record_url(identifier);
        tracing::info!("Fetching catalog record {}", identifier);

        let response = match self.get(&url, self.config.timeout_secs).await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => {
                tracing::warn!("Catalog query for {} failed, retrying: {}", identifier, e);
                self.get(&url, self.config.retry_timeout_secs).await?
            }
            Err(e) => return Err(e.into()),
        };

        if response.status() != StatusCode::OK {
            tracing::error!("Catalog request failed with status {}", response.status());
            return Err(AppError::Catalog(format!(
                "Failed to reach catalog service (status {})",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    async fn get(&self, url: &str, timeout_secs: u64) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(url)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
    }
}

#[async_trait]
impl RecordSource for CatalogClient {
    async fn lookup_record(&self, identifier: &str) -> AppResult<MarcRecord> {
        let body = self.fetch_marcxml(identifier).await?;
        MarcRecord::from_marcxml(&body).map_err(|e| {
            tracing::error!("Catalog returned an unusable record for {}", identifier);
            e
        })
    }
}
