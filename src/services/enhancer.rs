//! Record enhancement service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    marc::{MarcRecord, MarcTranslator},
    models::{InstanceRecord, WorkRecord},
    services::catalog::RecordSource,
};

/// Only catalog numbers can be looked up
pub const SUPPORTED_ID_TYPE: &str = "oclc";

#[derive(Clone)]
pub struct EnhancerService {
    source: Arc<dyn RecordSource>,
    translator: Arc<MarcTranslator>,
}

impl EnhancerService {
    pub fn new(source: Arc<dyn RecordSource>, translator: Arc<MarcTranslator>) -> Self {
        Self { source, translator }
    }

    /// Fetch the catalog record for `identifier` and translate it
    pub async fn fetch_data(&self, identifier: &str, id_type: &str) -> AppResult<InstanceRecord> {
        if id_type != SUPPORTED_ID_TYPE {
            tracing::error!("Catalog lookup requires an OCLC identifier, got '{}'", id_type);
            return Err(AppError::InvalidRequest(
                "Catalog lookup requires an OCLC number".to_string(),
            ));
        }

        tracing::info!("Loading MARC for record {}", identifier);
        let record = self.source.lookup_record(identifier).await.map_err(|e| {
            tracing::error!("Catalog query failed: {}", e);
            e
        })?;

        Ok(self.translate_record(&record).await)
    }

    pub async fn translate_record(&self, record: &MarcRecord) -> InstanceRecord {
        self.translator.translate(record).await
    }

    /// Attach the instance found for `identifier` to `work`, folding its
    /// agents into the work's agents
    pub async fn enhance_work(&self, work: &mut WorkRecord, identifier: &str) -> AppResult<()> {
        let instance = self.fetch_data(identifier, SUPPORTED_ID_TYPE).await?;
        work.merge_agents(instance.agents.clone());
        work.add_instance(instance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::HoldingsResolver;
    use crate::marc::DataField;
    use crate::models::Agent;
    use crate::services::lookup::MockHoldingsLookup;
    use async_trait::async_trait;

    struct StaticSource(MarcRecord);

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn lookup_record(&self, identifier: &str) -> AppResult<MarcRecord> {
            if identifier == "404" {
                return Err(AppError::Catalog("Failed to reach catalog service".into()));
            }
            Ok(self.0.clone())
        }
    }

    fn service() -> EnhancerService {
        let record = MarcRecord::new()
            .with_control_field("001", "7777")
            .with_field(DataField::new("245", '1', '0', &[('a', "Typee")]))
            .with_field(DataField::new("260", ' ', ' ', &[('b', "John Murray")]));
        let holdings = HoldingsResolver::new(Arc::new(MockHoldingsLookup::new()), "{}");
        EnhancerService::new(
            Arc::new(StaticSource(record)),
            Arc::new(MarcTranslator::new(holdings)),
        )
    }

    #[tokio::test]
    async fn test_fetch_data_rejects_other_identifier_types() {
        let result = service().fetch_data("9780142437247", "isbn").await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_fetch_data() {
        let instance = service().fetch_data("7777", "oclc").await.unwrap();
        assert_eq!(instance.title.as_deref(), Some("Typee"));
        assert_eq!(instance.identifier("oclc"), Some("7777"));
    }

    #[tokio::test]
    async fn test_fetch_data_propagates_catalog_errors() {
        let result = service().fetch_data("404", "oclc").await;
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_enhance_work_merges_agents() {
        let mut work = WorkRecord::new();
        work.add_agent(Agent::with_role("John Murray.", "publisher"));
        work.add_agent(Agent::with_role("Melville, Herman", "author"));

        service().enhance_work(&mut work, "7777").await.unwrap();

        assert_eq!(work.instances.len(), 1);
        assert_eq!(work.agents.len(), 2);
        let murray = work.agents.iter().find(|a| a.name == "John Murray").unwrap();
        assert_eq!(murray.roles, vec!["publisher", "publisher"]);
    }
}
