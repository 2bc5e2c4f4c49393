//! Core data models for subscription sources and channel entries

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Marker appended to a channel's extra info in hotel mode
pub const HOTEL_MARKER: &str = "酒店";

/// Catalog shape selected once per run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscribeMode {
    /// Structured entries with headers and extra info
    #[default]
    Plain,
    /// Bare stream URLs nested by region and stream type
    Multicast,
    /// Plain-shaped entries whose extra info carries the region hotel marker
    Hotel,
}

impl SubscribeMode {
    /// Human label used in progress messages and logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Plain => "subscribe",
            Self::Multicast => "multicast",
            Self::Hotel => "hotel",
        }
    }

    pub fn is_multicast(&self) -> bool {
        matches!(self, Self::Multicast)
    }

    pub fn is_hotel(&self) -> bool {
        matches!(self, Self::Hotel)
    }
}

/// One subscription endpoint
///
/// Deserializes from either a bare URL string or a
/// `{url, region, type}` object, so plain source lists stay a flat
/// array of strings while multicast/hotel lists carry their metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SourceSpec")]
pub struct SubscribeSource {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
}

impl SubscribeSource {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            region: None,
            stream_type: None,
        }
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_stream_type<S: Into<String>>(mut self, stream_type: S) -> Self {
        self.stream_type = Some(stream_type.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceSpec {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        region: Option<String>,
        #[serde(default, rename = "type")]
        stream_type: Option<String>,
    },
}

impl From<SourceSpec> for SubscribeSource {
    fn from(spec: SourceSpec) -> Self {
        match spec {
            SourceSpec::Url(url) => SubscribeSource::new(url),
            SourceSpec::Detailed {
                url,
                region,
                stream_type,
            } => SubscribeSource {
                url,
                region,
                stream_type,
            },
        }
    }
}

/// Provenance tag for entries contributed by whitelisted sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    Whitelist,
}

/// One resolvable stream for a channel in plain or hotel mode
///
/// Multicast mode stores bare URL strings instead; see
/// [`crate::catalog::MulticastCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub extra_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<EntryOrigin>,
}

impl StreamEntry {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            headers: None,
            extra_info: String::new(),
            origin: None,
        }
    }

    pub fn with_extra_info<S: Into<String>>(mut self, extra_info: S) -> Self {
        self.extra_info = extra_info.into();
        self
    }
}
