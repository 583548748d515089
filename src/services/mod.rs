//! Business logic services

pub mod agents;
pub mod catalog;
pub mod enhancer;
pub mod lookup;
pub mod output;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::AppResult,
    holdings::HoldingsResolver,
    marc::MarcTranslator,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub enhancer: enhancer::EnhancerService,
}

impl Services {
    /// Build the HTTP collaborators once and wire them into the pipeline
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let lookup = Arc::new(lookup::HttpLookupClient::new(config.services.clone())?);

        let catalog_client = reqwest::Client::builder()
            .user_agent(&config.services.user_agent)
            .build()?;
        // Timeouts are set per attempt, connect included
        let catalog = Arc::new(catalog::CatalogClient::new(catalog_client, config.catalog.clone()));

        let holdings = HoldingsResolver::new(lookup.clone(), config.services.hathi_download_url.clone());
        let mut translator = MarcTranslator::new(holdings);
        if config.services.agent_lookup_url.is_some() {
            translator = translator.with_agent_lookup(lookup.clone());
        } else {
            tracing::info!("No agent lookup endpoint configured, agents will not be enriched");
        }

        let enhancer = enhancer::EnhancerService::new(catalog, Arc::new(translator));

        Ok(Self { enhancer })
    }
}
