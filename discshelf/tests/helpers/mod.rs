//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::response::Response;
use discshelf::services::catalog::{
    Catalog, CatalogError, Master, Release, SearchResult, SearchResults, TracklistEntry, Version,
    VersionList, Video,
};
use discshelf::services::{DiscogsClient, ReconcilerConfig};
use discshelf::AppState;
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory database with the full schema
///
/// One connection only: every `:memory:` connection is its own database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    discshelf_common::db::init_schema(&pool).await.unwrap();
    pool
}

/// Insert an artist, an album and its tracks; returns the album id
pub async fn seed_album(
    pool: &SqlitePool,
    discogs_id: Option<i64>,
    artist: &str,
    tracks: &[(&str, Option<&str>)],
) -> i64 {
    let artist_id = sqlx::query("INSERT INTO artists (name) VALUES (?)")
        .bind(artist)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();

    let album_id = sqlx::query("INSERT INTO albums (title, discogs_id, artist_id) VALUES (?, ?, ?)")
        .bind(format!("{} album", artist))
        .bind(discogs_id)
        .bind(artist_id)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();

    for (title, duration) in tracks {
        sqlx::query("INSERT INTO tracks (title, duration, album_id) VALUES (?, ?, ?)")
            .bind(*title)
            .bind(*duration)
            .bind(album_id)
            .execute(pool)
            .await
            .unwrap();
    }

    album_id
}

/// (title, duration) of every track of `album_id`, in insertion order
pub async fn album_durations(pool: &SqlitePool, album_id: i64) -> Vec<(String, Option<String>)> {
    sqlx::query_as("SELECT title, duration FROM tracks WHERE album_id = ? ORDER BY id")
        .bind(album_id)
        .fetch_all(pool)
        .await
        .unwrap()
}

pub fn tracklist(entries: &[(&str, &str)]) -> Vec<TracklistEntry> {
    entries
        .iter()
        .map(|(title, duration)| TracklistEntry::new(*title, *duration))
        .collect()
}

pub fn release(id: i64, entries: &[(&str, &str)]) -> Release {
    Release {
        id,
        title: format!("Release {}", id),
        tracklist: tracklist(entries),
        videos: vec![],
    }
}

pub fn video(title: &str, seconds: i64) -> Video {
    Video {
        title: title.to_string(),
        duration: seconds,
        uri: None,
    }
}

/// Catalog served from maps, recording every call
#[derive(Default)]
pub struct FakeCatalog {
    pub masters: HashMap<i64, Master>,
    pub releases: HashMap<i64, Release>,
    pub versions: HashMap<i64, Vec<i64>>,
    /// Lowercased track title → release ids returned by search
    pub search_hits: HashMap<String, Vec<i64>>,
    pub failing_masters: HashSet<i64>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_master(mut self, master: Master) -> Self {
        self.masters.insert(master.id, master);
        self
    }

    pub fn with_release(mut self, release: Release) -> Self {
        self.releases.insert(release.id, release);
        self
    }

    pub fn with_versions(mut self, master_id: i64, versions: &[i64]) -> Self {
        self.versions.insert(master_id, versions.to_vec());
        self
    }

    pub fn with_search_hits(mut self, title: &str, releases: &[i64]) -> Self {
        self.search_hits.insert(title.to_lowercase(), releases.to_vec());
        self
    }

    pub fn with_failing_master(mut self, master_id: i64) -> Self {
        self.failing_masters.insert(master_id);
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn master(&self, id: i64) -> Result<Master, CatalogError> {
        self.record(format!("master:{}", id));
        if self.failing_masters.contains(&id) {
            return Err(CatalogError::Network("connection reset".to_string()));
        }
        self.masters
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("/masters/{}", id)))
    }

    async fn release(&self, id: i64) -> Result<Release, CatalogError> {
        self.record(format!("release:{}", id));
        self.releases
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("/releases/{}", id)))
    }

    async fn master_versions(&self, master_id: i64) -> Result<VersionList, CatalogError> {
        self.record(format!("versions:{}", master_id));
        let versions = self
            .versions
            .get(&master_id)
            .map(|ids| ids.iter().map(|id| Version { id: *id, title: None }).collect())
            .unwrap_or_default();
        Ok(VersionList { versions })
    }

    async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<SearchResults, CatalogError> {
        self.record(format!("search:{}|{}", title, artist.unwrap_or_default()));
        let results = self
            .search_hits
            .get(&title.to_lowercase())
            .map(|ids| {
                ids.iter()
                    .map(|id| SearchResult {
                        id: Some(*id),
                        title: None,
                        kind: Some("release".to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(SearchResults { results })
    }
}

/// App state over `pool` with `catalog`, no pauses and no Discogs token
pub fn test_state(pool: SqlitePool, catalog: Arc<dyn Catalog>) -> AppState {
    let discogs = Arc::new(DiscogsClient::new("discshelf-tests", None).unwrap());
    AppState::new(pool, discogs)
        .with_catalog(catalog)
        .with_reconciler_config(ReconcilerConfig::unthrottled())
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
