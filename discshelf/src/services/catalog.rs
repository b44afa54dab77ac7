//! Catalog records and the `Catalog` seam
//!
//! The record types mirror the subset of the Discogs JSON the service reads.
//! Every field the service does not strictly need is defaulted so partial or
//! slightly different payloads still deserialize.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Discogs API token not configured. Please set it in Settings.")]
    MissingToken,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One tracklist row of a master or release
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TracklistEntry {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub title: String,
    /// `M:SS` text, empty when the catalog has no duration
    #[serde(default)]
    pub duration: Option<String>,
    /// "track", "heading" or "index"
    #[serde(rename = "type_", default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
}

impl TracklistEntry {
    pub fn new(title: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            position: None,
            title: title.into(),
            duration: Some(duration.into()),
            entry_type: None,
        }
    }

    /// Section headings carry no audio and are not stored as tracks
    pub fn is_heading(&self) -> bool {
        self.entry_type.as_deref() == Some("heading")
    }
}

/// Video attached to a master or release
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Video {
    #[serde(default)]
    pub title: String,
    /// Length in seconds
    #[serde(default)]
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Image {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub uri: String,
}

/// Artist credit as embedded in a master
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CatalogArtist {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Master: catalog-level grouping of releases of one album
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Master {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub main_release: Option<i64>,
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
    #[serde(default)]
    pub tracklist: Vec<TracklistEntry>,
    #[serde(default)]
    pub videos: Vec<Video>,
}

impl Master {
    /// Year as stored in the library (`2020`, `"2020"` and missing all work)
    pub fn year_text(&self) -> String {
        match &self.year {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Release: one pressing/edition with its own tracklist
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Release {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tracklist: Vec<TracklistEntry>,
    #[serde(default)]
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Version {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VersionList {
    #[serde(default)]
    pub versions: Vec<Version>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Read access to the external catalog
///
/// Implemented by [`DiscogsClient`](super::discogs_client::DiscogsClient)
/// in production and by in-memory fakes in tests.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn master(&self, id: i64) -> Result<Master, CatalogError>;

    async fn release(&self, id: i64) -> Result<Release, CatalogError>;

    async fn master_versions(&self, master_id: i64) -> Result<VersionList, CatalogError>;

    /// Release search qualified by track title and, when known, artist
    async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<SearchResults, CatalogError>;
}
