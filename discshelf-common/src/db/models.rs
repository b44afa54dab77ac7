//! Database models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Artist row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: i64,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub discogs_id: Option<i64>,
}

/// Album row
///
/// `discogs_id` is NULL for albums that were not imported from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: i64,
    pub title: Option<String>,
    pub year: Option<String>,
    pub genres: Option<String>,
    pub styles: Option<String>,
    pub discogs_id: Option<i64>,
    pub image_url: Option<String>,
    pub artist_id: i64,
}

/// Track row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i64,
    pub title: Option<String>,
    pub duration: Option<String>,
    pub album_id: i64,
}

impl Track {
    /// True when the duration is NULL or whitespace-only
    pub fn is_missing_duration(&self) -> bool {
        self.duration
            .as_deref()
            .map(|d| d.trim().is_empty())
            .unwrap_or(true)
    }
}
