//! Discogs API client
//!
//! Authenticated with a personal access token (`Authorization: Discogs
//! token=...`). The token can change at runtime when the user saves it in
//! settings, so it lives behind a lock rather than in the request builder.
//!
//! API Documentation: https://www.discogs.com/developers

use crate::services::catalog::{
    Catalog, CatalogError, Master, Release, SearchResults, VersionList,
};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::RwLock;

pub const DISCOGS_BASE_URL: &str = "https://api.discogs.com";

/// Authenticated Discogs quota
const REQUESTS_PER_MINUTE: u32 = 60;

/// Page size of `/masters/{id}/versions`
pub const VERSIONS_PAGE_SIZE: u32 = 10;

/// Page size of the per-track release search
pub const SEARCH_PAGE_SIZE: u32 = 5;

/// Page size of the album search shown to the user
pub const BROWSE_SEARCH_PAGE_SIZE: u32 = 20;

/// Discogs API client
pub struct DiscogsClient {
    http_client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl DiscogsClient {
    pub fn new(user_agent: &str, token: Option<String>) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let quota = NonZeroU32::new(REQUESTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http_client,
            base_url: DISCOGS_BASE_URL.to_string(),
            token: RwLock::new(token),
            rate_limiter: RateLimiter::direct(Quota::per_minute(quota)),
        })
    }

    /// Point the client at another host (local stubs)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.current_token().await.is_some()
    }

    async fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .clone()
            .filter(|t| crate::config::is_valid_token(t))
    }

    /// Send an authenticated GET, returning the raw response
    async fn send(&self, path_and_query: &str) -> Result<reqwest::Response, CatalogError> {
        let token = self.current_token().await.ok_or_else(|| {
            tracing::error!("Discogs API token not configured");
            CatalogError::MissingToken
        })?;

        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path_and_query);
        tracing::debug!(url = %url, "Making Discogs API request");

        self.http_client
            .get(&url)
            .header("Authorization", format!("Discogs token={}", token))
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, CatalogError> {
        let response = self.send(path_and_query).await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path_and_query.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// GET returning upstream status and body untouched
    async fn get_raw(&self, path_and_query: &str) -> Result<(u16, serde_json::Value), CatalogError> {
        let response = self.send(path_and_query).await?;
        let status = response.status().as_u16();
        let body = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok((status, body))
    }

    /// Master record as returned by Discogs, for the pass-through endpoint
    pub async fn master_raw(&self, id: i64) -> Result<(u16, serde_json::Value), CatalogError> {
        self.get_raw(&master_path(id)).await
    }

    /// Master search as returned by Discogs, for the pass-through endpoint
    pub async fn search_masters_raw(
        &self,
        query: &str,
        page: u32,
    ) -> Result<(u16, serde_json::Value), CatalogError> {
        self.get_raw(&master_search_path(query, page)).await
    }
}

fn master_path(id: i64) -> String {
    format!("/masters/{}", id)
}

fn release_path(id: i64) -> String {
    format!("/releases/{}", id)
}

fn versions_path(master_id: i64) -> String {
    format!("/masters/{}/versions?per_page={}", master_id, VERSIONS_PAGE_SIZE)
}

fn track_search_path(title: &str, artist: Option<&str>) -> String {
    let query = match artist {
        Some(artist) if !artist.trim().is_empty() => format!("{} {}", title, artist),
        _ => title.to_string(),
    };
    format!(
        "/database/search?q={}&type=release&per_page={}",
        urlencoding::encode(&query),
        SEARCH_PAGE_SIZE
    )
}

fn master_search_path(query: &str, page: u32) -> String {
    format!(
        "/database/search?q={}&type=master&per_page={}&page={}",
        urlencoding::encode(query),
        BROWSE_SEARCH_PAGE_SIZE,
        page
    )
}

#[async_trait]
impl Catalog for DiscogsClient {
    async fn master(&self, id: i64) -> Result<Master, CatalogError> {
        self.get_json(&master_path(id)).await
    }

    async fn release(&self, id: i64) -> Result<Release, CatalogError> {
        self.get_json(&release_path(id)).await
    }

    async fn master_versions(&self, master_id: i64) -> Result<VersionList, CatalogError> {
        self.get_json(&versions_path(master_id)).await
    }

    async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<SearchResults, CatalogError> {
        self.get_json(&track_search_path(title, artist)).await
    }
}
