//! HTTP collaborators used while resolving holdings and agents
//!
//! Each seam is a trait so the resolver can be driven by fakes in tests; the
//! production implementation is [`HttpLookupClient`], constructed once and
//! passed explicitly to whoever needs it.

use async_trait::async_trait;
use reqwest::{header::LOCATION, redirect::Policy, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

use crate::{
    config::ServicesConfig,
    error::{AppError, AppResult},
};

/// Metadata document of a page-scan repository item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanMetadata {
    #[serde(default)]
    pub metadata: ScanItemMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanItemMetadata {
    /// Absent means public
    #[serde(rename = "access-restricted-item", default, deserialize_with = "deserialize_flag")]
    pub access_restricted_item: bool,
}

/// One volume listed by the HathiTrust record-items API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HathiItem {
    #[serde(rename = "rightsCode", default)]
    pub rights_code: Option<String>,
    #[serde(rename = "itemURL")]
    pub item_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HathiRecord {
    #[serde(default)]
    items: Vec<HathiItem>,
}

/// Name authority answer for a contributor
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AgentAuthority {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub viaf: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub lcnaf: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HoldingsLookup: Send + Sync {
    /// Fetch the metadata document of a page-scan repository item
    async fn scan_metadata(&self, metadata_url: &str) -> AppResult<ScanMetadata>;

    /// List the volumes of a HathiTrust catalog record (`"oclc/12345"`)
    async fn hathi_items(&self, record_key: &str) -> AppResult<Vec<HathiItem>>;

    /// Resolve a permanent redirect, returning its `Location`
    async fn resolve_redirect(&self, url: &str) -> AppResult<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentLookup: Send + Sync {
    async fn lookup_agent(&self, name: &str, corporate: bool) -> AppResult<AgentAuthority>;
}

/// reqwest-backed implementation of every lookup seam
#[derive(Clone)]
pub struct HttpLookupClient {
    client: Client,
    /// Never follows redirects, so `Location` stays observable
    head_client: Client,
    config: ServicesConfig,
}

impl HttpLookupClient {
    pub fn new(config: ServicesConfig) -> AppResult<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        let head_client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            client,
            head_client,
            config,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let url = with_scheme(url);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).query(query).send().await?;
        if response.status() != StatusCode::OK {
            return Err(AppError::Upstream(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed response from {}: {}", url, e)))
    }
}

#[async_trait]
impl HoldingsLookup for HttpLookupClient {
    async fn scan_metadata(&self, metadata_url: &str) -> AppResult<ScanMetadata> {
        self.get_json(metadata_url, &[]).await
    }

    async fn hathi_items(&self, record_key: &str) -> AppResult<Vec<HathiItem>> {
        let url = self.config.hathi_volumes_url.replace("{}", record_key);
        let record: HathiRecord = self.get_json(&url, &[]).await?;
        Ok(record.items)
    }

    async fn resolve_redirect(&self, url: &str) -> AppResult<String> {
        let response = self.head_client.head(with_scheme(url)).send().await?;
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                AppError::Upstream(format!(
                    "{} answered {} without a Location header",
                    url,
                    response.status()
                ))
            })
    }
}

#[async_trait]
impl AgentLookup for HttpLookupClient {
    async fn lookup_agent(&self, name: &str, corporate: bool) -> AppResult<AgentAuthority> {
        let url = self
            .config
            .agent_lookup_url
            .as_deref()
            .ok_or_else(|| AppError::Upstream("No agent lookup endpoint configured".to_string()))?;

        let mut query = vec![("queryName", name)];
        if corporate {
            query.push(("queryType", "corporate"));
        }
        self.get_json(url, &query).await
    }
}

/// Catalog links are frequently recorded without a scheme
fn with_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Accepts `true`/`false` as booleans or strings
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => s.eq_ignore_ascii_case("true"),
        None => false,
    })
}

/// Authority ids come back as strings or bare numbers
fn deserialize_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    }))
}
