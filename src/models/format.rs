//! Links and formats (digital/physical manifestations)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DataObject, Identifier, Measurement};

/// Fixed set of access characteristics of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkFlags {
    pub local: bool,
    pub download: bool,
    pub images: bool,
    pub ebook: bool,
}

impl LinkFlags {
    /// Direct ebook
    pub fn ebook() -> Self {
        Self { ebook: true, ..Self::default() }
    }

    /// Page-image viewer, read online
    pub fn viewer() -> Self {
        Self { images: true, ..Self::default() }
    }

    /// Downloadable page images (e.g. a PDF)
    pub fn download() -> Self {
        Self { download: true, images: true, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub flags: LinkFlags,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Link {
    pub fn new(url: impl Into<String>, media_type: impl Into<String>, flags: LinkFlags) -> Self {
        Self {
            url: url.into(),
            media_type: Some(media_type.into()),
            flags,
            thumbnail: None,
            content: None,
        }
    }
}

impl DataObject for Link {}

/// One manifestation of an instance. Always built with exactly one link;
/// further links may be pushed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub content_type: String,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub drm: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub links: Vec<Link>,
    #[serde(default)]
    pub identifiers: Vec<Identifier>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl Format {
    pub fn with_link(content_type: impl Into<String>, link: Link) -> Self {
        Self {
            content_type: content_type.into(),
            modified: None,
            drm: None,
            source: None,
            links: vec![link],
            identifiers: Vec::new(),
            measurements: Vec::new(),
        }
    }

    /// Convenience form: the single link is built from a URL and media type
    pub fn with_url(
        content_type: impl Into<String>,
        url: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self::with_link(content_type, Link::new(url, media_type, LinkFlags::default()))
    }

    /// Replace all links with `link`
    pub fn set_link(&mut self, link: Link) {
        self.links = vec![link];
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifiers.push(identifier);
        self
    }
}

impl DataObject for Format {}
