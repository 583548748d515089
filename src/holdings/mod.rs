//! Electronic holdings (856) resolution
//!
//! Each 856 field is classified, first match wins:
//! 1. a known ebook source (page-scan repository, e-text archive, HathiTrust
//!    catalog page) produces formats,
//! 2. a bare identifier pattern produces an identifier,
//! 3. anything else becomes a plain web link.

pub mod hathi;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    marc::{TaggedField, TaggedRecord},
    models::{identifier::URI_WEIGHT, Format, Identifier, InstanceRecord, Link, LinkFlags},
    services::lookup::HoldingsLookup,
};

pub use hathi::HathiFetcher;

pub const HOLDINGS_TAG: &str = "856";
/// First indicator of an 856 carrying an HTTP reference
pub const URI_INDICATOR: char = '4';
const URI_SUBFIELD: char = 'u';

/// Last path segment, without a trailing 3-4 letter extension
static URI_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([^/.]+)(?:\.[a-z]{3,4})?$").expect("valid uri id regex"));

static HATHI_RECORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z]+/[a-z0-9]+)\.html$").expect("valid hathi record regex"));

/// Ebook sources, in matching order
static EBOOK_PATTERNS: Lazy<Vec<(EbookSource, Regex)>> = Lazy::new(|| {
    [
        (EbookSource::InternetArchive, r"archive.org/details/[a-z0-9]+$"),
        (EbookSource::Gutenberg, r"gutenberg.org/ebooks/[0-9]+\.epub\.(?:no|)images$"),
        (
            EbookSource::HathiTrust,
            r"catalog.hathitrust.org/api/volumes/[a-z]{3,6}/[a-zA-Z0-9]+\.html",
        ),
    ]
    .into_iter()
    .map(|(source, pattern)| (source, Regex::new(pattern).expect("valid ebook regex")))
    .collect()
});

/// Identifier schemes recoverable from a URI, in matching order
static IDENTIFIER_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [("oclc", r"oclc/([0-9]+)"), ("gutenberg", r"gutenberg.org/ebooks/([0-9]+)$")]
        .into_iter()
        .map(|(scheme, pattern)| (scheme, Regex::new(pattern).expect("valid identifier regex")))
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EbookSource {
    InternetArchive,
    Gutenberg,
    HathiTrust,
}

impl EbookSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EbookSource::InternetArchive => "internetarchive",
            EbookSource::Gutenberg => "gutenberg",
            EbookSource::HathiTrust => "hathitrust",
        }
    }
}

/// Outcome of resolving one holdings field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// One direct ebook format was added
    Ebook(EbookSource),
    /// A HathiTrust record was expanded into this many volume formats
    HathiVolumes(usize),
    /// A bare identifier of this scheme was added
    Identifier(&'static str),
    /// A generic web link was added
    WebLink,
}

/// URI of a usable holdings field and the identifier derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingLink {
    pub uri: String,
    pub identifier: String,
}

/// Validate an 856 and read its URI
pub fn parse_holding<F: TaggedField + ?Sized>(field: &F) -> AppResult<HoldingLink> {
    if field.ind1() != URI_INDICATOR {
        return Err(AppError::Field(format!(
            "{} does not contain an HTTP reference",
            field.tag()
        )));
    }

    let uri = field.subfield(URI_SUBFIELD).ok_or_else(|| {
        AppError::Field(format!("{} field is missing u subfield for URI", field.tag()))
    })?;

    Ok(HoldingLink {
        uri: uri.to_string(),
        identifier: uri_identifier(uri),
    })
}

/// Identifier carried by the last path segment of `uri` ("1234" for
/// `http://test.com/1234.epub`), or the whole URI when there is none
pub fn uri_identifier(uri: &str) -> String {
    URI_ID_REGEX
        .captures(uri)
        .and_then(|c| c.get(1))
        .map_or_else(|| uri.to_string(), |m| m.as_str().to_string())
}

/// Add a weighted identifier if `uri` matches a known identifier pattern
pub fn match_identifier(uri: &str, instance: &mut InstanceRecord) -> Option<&'static str> {
    IDENTIFIER_PATTERNS.iter().find_map(|(scheme, regex)| {
        let value = regex.captures(uri)?.get(1)?.as_str();
        instance.add_identifier(Identifier::new(*scheme, value, URI_WEIGHT));
        Some(*scheme)
    })
}

/// Generic link, all access flags off
pub fn web_link(uri: &str) -> Link {
    Link::new(uri, "text/html", LinkFlags::default())
}

#[derive(Clone)]
pub struct HoldingsResolver {
    lookup: Arc<dyn HoldingsLookup>,
    hathi: HathiFetcher,
}

impl HoldingsResolver {
    pub fn new(lookup: Arc<dyn HoldingsLookup>, hathi_download_url: impl Into<String>) -> Self {
        let hathi = HathiFetcher::new(lookup.clone(), hathi_download_url);
        Self { lookup, hathi }
    }

    /// Resolve every 856 of `record` into `instance`. A failing field is
    /// logged and skipped.
    pub async fn extract_holdings<R: TaggedRecord + ?Sized>(&self, record: &R, instance: &mut InstanceRecord) {
        for field in record.fields(HOLDINGS_TAG) {
            match self.resolve_field(field, instance).await {
                Ok(resolution) => tracing::debug!("Resolved 856 field as {:?}", resolution),
                Err(e) => {
                    tracing::error!("Unable to parse 856 field");
                    tracing::debug!("{}", e);
                }
            }
        }
    }

    pub async fn resolve_field<F: TaggedField + ?Sized>(
        &self,
        field: &F,
        instance: &mut InstanceRecord,
    ) -> AppResult<Resolution> {
        let link = parse_holding(field)?;

        if let Some(resolution) = self.match_ebook(&link, instance).await {
            return Ok(resolution);
        }

        if let Some(scheme) = match_identifier(&link.uri, instance) {
            return Ok(Resolution::Identifier(scheme));
        }

        instance.add_link(web_link(&link.uri));
        Ok(Resolution::WebLink)
    }

    /// `None` when no ebook source claims the link, or when the claiming
    /// source declines it (restricted scan, Hathi record without volumes)
    async fn match_ebook(&self, link: &HoldingLink, instance: &mut InstanceRecord) -> Option<Resolution> {
        let source = EBOOK_PATTERNS
            .iter()
            .find(|(_, regex)| regex.is_match(&link.uri))
            .map(|(source, _)| *source)?;

        match source {
            EbookSource::InternetArchive => {
                if self.scan_is_restricted(&link.uri).await {
                    return None;
                }
            }
            EbookSource::HathiTrust => {
                return self
                    .load_hathi_catalog(&link.uri, instance)
                    .await
                    .map(Resolution::HathiVolumes);
            }
            EbookSource::Gutenberg => {}
        }

        let format = Format::with_link("ebook", Link::new(link.uri.as_str(), "text/html", LinkFlags::ebook()))
            .source(source.as_str())
            .identifier(Identifier::new(source.as_str(), link.identifier.as_str(), URI_WEIGHT));
        instance.add_format(format);
        Some(Resolution::Ebook(source))
    }

    /// Unreachable metadata counts as restricted
    async fn scan_is_restricted(&self, uri: &str) -> bool {
        let metadata_url = uri.replace("details", "metadata");
        match self.lookup.scan_metadata(&metadata_url).await {
            Ok(scan) => scan.metadata.access_restricted_item,
            Err(e) => {
                tracing::warn!("Scan metadata lookup failed for {}: {}", metadata_url, e);
                true
            }
        }
    }

    async fn load_hathi_catalog(&self, uri: &str, instance: &mut InstanceRecord) -> Option<usize> {
        if !uri.contains("catalog") {
            return None;
        }

        let record_key = HATHI_RECORD_REGEX.captures(uri)?.get(1)?.as_str();
        let items = match self.lookup.hathi_items(record_key).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("HathiTrust item lookup failed for {}: {}", record_key, e);
                return None;
            }
        };

        if items.is_empty() {
            tracing::debug!("HathiTrust record {} lists no items", record_key);
            return None;
        }

        Some(self.hathi.fetch(items, instance).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marc::DataField;
    use crate::services::lookup::{HathiItem, MockHoldingsLookup, ScanItemMetadata, ScanMetadata};

    const DOWNLOAD_URL: &str = "babel.hathitrust.org/cgi/imgsrv/download/pdf?id={}";

    fn resolver(lookup: MockHoldingsLookup) -> HoldingsResolver {
        HoldingsResolver::new(Arc::new(lookup), DOWNLOAD_URL)
    }

    fn holding(uri: &str) -> DataField {
        DataField::new("856", '4', '0', &[('u', uri)])
    }

    fn scan(restricted: bool) -> ScanMetadata {
        ScanMetadata {
            metadata: ScanItemMetadata {
                access_restricted_item: restricted,
            },
        }
    }

    #[test]
    fn test_uri_identifier() {
        assert_eq!(uri_identifier("http://www.test.org/123-abc.test"), "123-abc");
        assert_eq!(uri_identifier("http://test.org/123-abc.test"), "123-abc");
        assert_eq!(uri_identifier("http://test.org/a1b2c3c4"), "a1b2c3c4");
        assert_eq!(uri_identifier("http://test.com/1234.epub"), "1234");
        assert_eq!(uri_identifier("test.org"), "test.org");
        assert_eq!(uri_identifier("http://test.org/a1b2c3c4/"), "http://test.org/a1b2c3c4/");
    }

    #[test]
    fn test_parse_holding_wrong_ind1() {
        let field = DataField::new("856", '1', '0', &[('u', "http://test.org/1")]);
        assert!(matches!(parse_holding(&field), Err(AppError::Field(_))));
    }

    #[test]
    fn test_parse_holding_missing_u_subfield() {
        let field = DataField::new("856", '4', '0', &[('z', "Full view")]);
        assert!(matches!(parse_holding(&field), Err(AppError::Field(_))));
    }

    #[test]
    fn test_parse_holding() {
        let link = parse_holding(&holding("http://test.org/abc.pdf")).unwrap();
        assert_eq!(link.uri, "http://test.org/abc.pdf");
        assert_eq!(link.identifier, "abc");
    }

    #[test]
    fn test_match_identifier() {
        let mut instance = InstanceRecord::default();
        assert_eq!(match_identifier("test.org/oclc/123465", &mut instance), Some("oclc"));
        assert_eq!(instance.identifiers, vec![Identifier::new("oclc", "123465", 0.8)]);

        assert_eq!(match_identifier("www.test.org/test123.epub", &mut instance), None);
        assert_eq!(instance.identifiers.len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_indicator_produces_nothing() {
        let field = DataField::new("856", '0', '0', &[('u', "http://www.gutenberg.org/ebooks/2701")]);
        let mut instance = InstanceRecord::default();

        let result = resolver(MockHoldingsLookup::new()).resolve_field(&field, &mut instance).await;

        assert!(result.is_err());
        assert!(instance.links.is_empty());
        assert!(instance.formats.is_empty());
        assert!(instance.identifiers.is_empty());
    }

    #[tokio::test]
    async fn test_gutenberg_ebook() {
        let mut instance = InstanceRecord::default();
        let result = resolver(MockHoldingsLookup::new())
            .resolve_field(&holding("gutenberg.org/ebooks/123.epub.images"), &mut instance)
            .await
            .unwrap();

        assert_eq!(result, Resolution::Ebook(EbookSource::Gutenberg));
        assert_eq!(instance.formats.len(), 1);
        assert_eq!(instance.formats[0].content_type, "ebook");
        assert!(instance.formats[0].links[0].flags.ebook);
        assert!(instance.links.is_empty());
    }

    #[tokio::test]
    async fn test_generic_uri_is_not_an_ebook() {
        let mut instance = InstanceRecord::default();
        let result = resolver(MockHoldingsLookup::new())
            .resolve_field(&holding("www.test.org/test123.epub"), &mut instance)
            .await
            .unwrap();

        assert_eq!(result, Resolution::WebLink);
        assert!(instance.formats.is_empty());
        assert_eq!(instance.links, vec![web_link("www.test.org/test123.epub")]);
        assert_eq!(instance.links[0].flags, LinkFlags::default());
    }

    #[tokio::test]
    async fn test_gutenberg_identifier_link() {
        let mut instance = InstanceRecord::default();
        let result = resolver(MockHoldingsLookup::new())
            .resolve_field(&holding("http://www.gutenberg.org/ebooks/2701"), &mut instance)
            .await
            .unwrap();

        assert_eq!(result, Resolution::Identifier("gutenberg"));
        assert_eq!(instance.identifiers, vec![Identifier::new("gutenberg", "2701", 0.8)]);
    }

    #[tokio::test]
    async fn test_public_scan_is_ebook() {
        let mut lookup = MockHoldingsLookup::new();
        lookup
            .expect_scan_metadata()
            .withf(|url: &str| url == "archive.org/metadata/testwork00")
            .times(1)
            .returning(|_| Ok(scan(false)));

        let mut instance = InstanceRecord::default();
        let result = resolver(lookup)
            .resolve_field(&holding("archive.org/details/testwork00"), &mut instance)
            .await
            .unwrap();

        assert_eq!(result, Resolution::Ebook(EbookSource::InternetArchive));
        assert_eq!(instance.formats[0].identifiers[0].identifier, "testwork00");
    }

    #[tokio::test]
    async fn test_restricted_scan_falls_through() {
        let mut lookup = MockHoldingsLookup::new();
        lookup.expect_scan_metadata().times(1).returning(|_| Ok(scan(true)));

        let mut instance = InstanceRecord::default();
        let result = resolver(lookup)
            .resolve_field(&holding("archive.org/details/testwork00"), &mut instance)
            .await
            .unwrap();

        assert_eq!(result, Resolution::WebLink);
        assert!(instance.formats.is_empty());
        assert_eq!(instance.links.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_scan_lookup_falls_through() {
        let mut lookup = MockHoldingsLookup::new();
        lookup
            .expect_scan_metadata()
            .returning(|_| Err(AppError::Upstream("status 503".into())));

        let mut instance = InstanceRecord::default();
        let result = resolver(lookup)
            .resolve_field(&holding("archive.org/details/testwork00"), &mut instance)
            .await
            .unwrap();

        assert_eq!(result, Resolution::WebLink);
        assert!(instance.formats.is_empty());
    }

    #[tokio::test]
    async fn test_hathi_catalog_expands_volumes() {
        let mut lookup = MockHoldingsLookup::new();
        lookup
            .expect_hathi_items()
            .withf(|key: &str| key == "oclc/0123456")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    HathiItem {
                        rights_code: Some("pd".into()),
                        item_url: "https://hdl.handle.net/2027/mdp.1".into(),
                    },
                    HathiItem {
                        rights_code: Some("ic".into()),
                        item_url: "https://hdl.handle.net/2027/mdp.2".into(),
                    },
                ])
            });
        lookup
            .expect_resolve_redirect()
            .times(1)
            .returning(|_| Ok("https://babel.hathitrust.org/cgi/pt?id=mdp.1".to_string()));

        let mut instance = InstanceRecord::default();
        let result = resolver(lookup)
            .resolve_field(
                &holding("https://catalog.hathitrust.org/api/volumes/oclc/0123456.html"),
                &mut instance,
            )
            .await
            .unwrap();

        assert_eq!(result, Resolution::HathiVolumes(1));
        assert_eq!(instance.formats.len(), 1);
        assert!(instance.links.is_empty());
        assert!(instance.identifiers.is_empty());
    }

    #[tokio::test]
    async fn test_hathi_catalog_without_items_falls_through() {
        let mut lookup = MockHoldingsLookup::new();
        lookup.expect_hathi_items().returning(|_| Ok(Vec::new()));

        let mut instance = InstanceRecord::default();
        let result = resolver(lookup)
            .resolve_field(
                &holding("https://catalog.hathitrust.org/api/volumes/oclc/0123456.html"),
                &mut instance,
            )
            .await
            .unwrap();

        assert_eq!(result, Resolution::Identifier("oclc"));
        assert_eq!(instance.identifiers[0].identifier, "0123456");
    }

    #[tokio::test]
    async fn test_bad_field_does_not_abort_record() {
        let record = crate::marc::MarcRecord::new()
            .with_field(DataField::new("856", '4', '0', &[('z', "no uri")]))
            .with_field(DataField::new("856", '7', '0', &[('u', "http://a.org/x")]))
            .with_field(holding("http://example.org/reader/123"));

        let mut instance = InstanceRecord::default();
        resolver(MockHoldingsLookup::new())
            .extract_holdings(&record, &mut instance)
            .await;

        assert_eq!(instance.links, vec![web_link("http://example.org/reader/123")]);
    }
}
