//! End-to-end translation of a catalog record with fake collaborators

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use catalog_enhancer::{
    holdings::HoldingsResolver,
    marc::{MarcRecord, MarcTranslator},
    models::{Agent, DataObject, WorkRecord},
    services::{
        catalog::RecordSource,
        enhancer::EnhancerService,
        lookup::{HathiItem, HoldingsLookup, ScanItemMetadata, ScanMetadata},
    },
    AppError, AppResult,
};

const MOBY_DICK: &str = include_str!("fixtures/moby_dick.xml");
const DOWNLOAD_URL: &str = "babel.hathitrust.org/cgi/imgsrv/download/pdf?id={}";

#[derive(Default)]
struct FakeHoldings {
    redirects: AtomicUsize,
}

#[async_trait]
impl HoldingsLookup for FakeHoldings {
    async fn scan_metadata(&self, metadata_url: &str) -> AppResult<ScanMetadata> {
        Ok(ScanMetadata {
            metadata: ScanItemMetadata {
                access_restricted_item: !metadata_url.ends_with("mobydickorwhale01melv"),
            },
        })
    }

    async fn hathi_items(&self, record_key: &str) -> AppResult<Vec<HathiItem>> {
        if record_key != "oclc/4932580" {
            return Ok(Vec::new());
        }
        Ok([Some("pd"), Some("ic"), None, Some("pdus")]
            .into_iter()
            .enumerate()
            .map(|(n, rights)| HathiItem {
                rights_code: rights.map(String::from),
                item_url: format!("https://hdl.handle.net/2027/uc1.b{}", n),
            })
            .collect())
    }

    async fn resolve_redirect(&self, url: &str) -> AppResult<String> {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        let volume = url.rsplit('/').next().unwrap_or_default();
        Ok(format!("https://babel.hathitrust.org/cgi/pt?id={}", volume))
    }
}

struct FixtureSource;

#[async_trait]
impl RecordSource for FixtureSource {
    async fn lookup_record(&self, identifier: &str) -> AppResult<MarcRecord> {
        match identifier {
            "4932580" => MarcRecord::from_marcxml(MOBY_DICK),
            _ => Err(AppError::Catalog("Failed to reach catalog service".to_string())),
        }
    }
}

fn enhancer(lookup: Arc<FakeHoldings>) -> EnhancerService {
    let translator = MarcTranslator::new(HoldingsResolver::new(lookup, DOWNLOAD_URL));
    EnhancerService::new(Arc::new(FixtureSource), Arc::new(translator))
}

#[tokio::test]
async fn test_translates_catalog_record() {
    let lookup = Arc::new(FakeHoldings::default());
    let instance = enhancer(lookup.clone()).fetch_data("4932580", "oclc").await.unwrap();

    assert_eq!(instance.title.as_deref(), Some("Moby-Dick;"));
    assert_eq!(instance.sub_title.as_deref(), Some("or, The whale /"));
    assert_eq!(instance.language.as_deref(), Some("eng;eng"));
    assert_eq!(instance.pub_place.as_deref(), Some("New York :"));
    assert_eq!(instance.extent.as_deref(), Some("xxiii, 635 p. ;; 20 cm."));
    assert_eq!(instance.identifier("lccn"), Some("06043210"));

    assert_eq!(instance.agents.len(), 1);
    assert_eq!(instance.agents[0].name, "Harper & Brothers,");

    assert_eq!(instance.dates.len(), 1);
    assert_eq!(instance.dates[0].display_date.as_deref(), Some("1851."));
    assert_eq!(instance.dates[0].date_range.as_deref(), Some("1851"));

    assert_eq!(instance.subjects.len(), 2);
    assert_eq!(instance.subjects[0].subject, "Whaling -- Fiction.");
    assert_eq!(instance.subjects[0].authority.as_deref(), Some("lcsh"));
    assert_eq!(instance.subjects[1].authority.as_deref(), Some("fast"));
    assert_eq!(
        instance.subjects[1].uri.as_deref(),
        Some("http://id.worldcat.org/fast/1172036")
    );
}

#[tokio::test]
async fn test_resolves_every_holding() {
    let lookup = Arc::new(FakeHoldings::default());
    let instance = enhancer(lookup.clone()).fetch_data("4932580", "oclc").await.unwrap();

    let mut sources: Vec<&str> = instance
        .formats
        .iter()
        .filter_map(|f| f.source.as_deref())
        .collect();
    sources.sort_unstable();
    assert_eq!(sources, vec!["gutenberg", "hathitrust", "hathitrust", "internetarchive"]);

    // Only public domain volumes are redirected
    assert_eq!(lookup.redirects.load(Ordering::SeqCst), 2);

    let hathi = instance
        .formats
        .iter()
        .find(|f| f.source.as_deref() == Some("hathitrust"))
        .unwrap();
    assert_eq!(hathi.links.len(), 2);
    assert_eq!(hathi.links[1].media_type.as_deref(), Some("application/pdf"));

    let oclc: Vec<f64> = instance
        .identifiers
        .iter()
        .filter(|i| i.id_type == "oclc")
        .map(|i| i.weight)
        .collect();
    assert_eq!(oclc, vec![1.0, 0.8]);

    assert_eq!(instance.links.len(), 1);
    assert_eq!(instance.links[0].url, "http://www.loc.gov/catdir/description/moby.html");
}

#[tokio::test]
async fn test_enhance_work_attaches_instance() {
    let mut work = WorkRecord::new();
    work.add_agent(Agent::with_role("Harper & Brothers", "publisher"));

    enhancer(Arc::new(FakeHoldings::default()))
        .enhance_work(&mut work, "4932580")
        .await
        .unwrap();

    assert_eq!(work.instances.len(), 1);
    assert_eq!(work.agents.len(), 1);
    assert_eq!(work.agents[0].roles, vec!["publisher", "publisher"]);

    let value = work.to_value().unwrap();
    assert_eq!(value["instances"][0]["title"], "Moby-Dick;");
}

#[test]
fn test_unknown_record_is_a_catalog_error() {
    let service = enhancer(Arc::new(FakeHoldings::default()));
    let result = tokio_test::block_on(service.fetch_data("1", "oclc"));
    assert!(matches!(result, Err(AppError::Catalog(_))));
}

#[test]
fn test_rejects_unsupported_identifier_type() {
    let service = enhancer(Arc::new(FakeHoldings::default()));
    let err = tokio_test::block_on(service.fetch_data("9780142437247", "isbn")).unwrap_err();
    assert_eq!(err.status_code(), 400);
}
