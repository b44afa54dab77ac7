//! Duration reconciler
//!
//! Backfills missing track durations from the catalog. Tracks are processed
//! album by album, one request at a time. For each track the sources in
//! [`RESOLUTION_ORDER`] are consulted until one yields a duration:
//!
//! 1. main release tracklist (adopted when it has any duration)
//! 2. first alternate version with any duration (only if 1 adopted nothing)
//! 3. the master's own tracklist (only if neither 1 nor 2 adopted a release)
//! 4. videos of the adopted record, matched by title containment
//! 5. per-track catalog search, first few results
//!
//! Album-scoped fetches are memoized in [`AlbumLookup`], so a master, its main
//! release and its versions are each requested at most once per album.
//! Every catalog request is followed by a fixed pause.

use crate::services::catalog::{Catalog, Master, Release};
use crate::services::duration::{duration_from_tracklist, duration_from_videos, has_valid_durations};
use async_trait::async_trait;
use discshelf_common::config::ReconcileSettings;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Search results consulted per track
pub const DEFAULT_SEARCH_CANDIDATES: usize = 3;

/// Versions consulted per master
pub const DEFAULT_VERSION_CANDIDATES: usize = 10;

/// Track selected for reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTrack {
    pub track_id: i64,
    pub title: Option<String>,
    pub album_id: i64,
}

/// What the reconciler needs to know about an album
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRef {
    pub album_id: i64,
    pub discogs_id: Option<i64>,
    pub artist_name: Option<String>,
}

/// Persistence used by the reconciler
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Tracks whose duration is NULL or blank, ordered by album then track
    async fn tracks_missing_duration(&self) -> discshelf_common::Result<Vec<PendingTrack>>;

    async fn album_context(&self, album_id: i64) -> discshelf_common::Result<Option<AlbumRef>>;

    /// Write `duration` unless the track already has one; true if written
    async fn persist_track_duration(
        &self,
        track_id: i64,
        duration: &str,
    ) -> discshelf_common::Result<bool>;
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Pause after each release, version list or search request
    pub release_pause: Duration,
    /// Pause after each album, and after each search for an album with no
    /// catalog id
    pub album_pause: Duration,
    pub search_candidates: usize,
    pub version_candidates: usize,
}

impl ReconcilerConfig {
    /// No pauses; used by tests
    pub fn unthrottled() -> Self {
        Self {
            release_pause: Duration::ZERO,
            album_pause: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            release_pause: Duration::from_millis(500),
            album_pause: Duration::from_millis(1000),
            search_candidates: DEFAULT_SEARCH_CANDIDATES,
            version_candidates: DEFAULT_VERSION_CANDIDATES,
        }
    }
}

impl From<&ReconcileSettings> for ReconcilerConfig {
    fn from(settings: &ReconcileSettings) -> Self {
        Self {
            release_pause: Duration::from_millis(settings.release_pause_ms),
            album_pause: Duration::from_millis(settings.album_pause_ms),
            search_candidates: settings.search_candidates,
            version_candidates: settings.version_candidates,
        }
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub updated: usize,
    pub total: usize,
}

/// Duration sources, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSource {
    TracklistFromMainRelease,
    TracklistFromAlternateVersion,
    TracklistFromMaster,
    VideoTitleMatch,
    CatalogSearchMatch,
}

pub const RESOLUTION_ORDER: [DurationSource; 5] = [
    DurationSource::TracklistFromMainRelease,
    DurationSource::TracklistFromAlternateVersion,
    DurationSource::TracklistFromMaster,
    DurationSource::VideoTitleMatch,
    DurationSource::CatalogSearchMatch,
];

impl DurationSource {
    pub fn name(self) -> &'static str {
        match self {
            DurationSource::TracklistFromMainRelease => "main_release",
            DurationSource::TracklistFromAlternateVersion => "alternate_version",
            DurationSource::TracklistFromMaster => "master",
            DurationSource::VideoTitleMatch => "video",
            DurationSource::CatalogSearchMatch => "search",
        }
    }

    async fn resolve(self, lookup: &mut AlbumLookup<'_>, title: &str) -> Option<String> {
        match self {
            DurationSource::TracklistFromMainRelease => lookup
                .main_release()
                .await
                .and_then(|r| duration_from_tracklist(&r.tracklist, title)),
            DurationSource::TracklistFromAlternateVersion => lookup
                .alternate_release()
                .await
                .and_then(|r| duration_from_tracklist(&r.tracklist, title)),
            DurationSource::TracklistFromMaster => {
                if lookup.adopted_release().is_some() {
                    return None;
                }
                lookup
                    .master
                    .as_ref()
                    .and_then(|m| duration_from_tracklist(&m.tracklist, title))
            }
            DurationSource::VideoTitleMatch => {
                let videos = match lookup.adopted_release() {
                    Some(release) => &release.videos,
                    None => &lookup.master.as_ref()?.videos,
                };
                duration_from_videos(videos, title)
            }
            DurationSource::CatalogSearchMatch => lookup.search(title).await,
        }
    }
}

/// Memoized catalog state for one album
///
/// `None` in a memo slot means "not tried yet"; `Some(None)` means tried and
/// nothing usable was found.
pub struct AlbumLookup<'a> {
    catalog: &'a dyn Catalog,
    config: &'a ReconcilerConfig,
    album: AlbumRef,
    master: Option<Master>,
    main_release: Option<Option<Release>>,
    alternate_release: Option<Option<Release>>,
}

impl<'a> AlbumLookup<'a> {
    /// Fetch the master when the album has a catalog id
    ///
    /// A failed master fetch leaves the tracklist and video sources empty;
    /// the album's tracks still reach the search source.
    async fn open(catalog: &'a dyn Catalog, config: &'a ReconcilerConfig, album: AlbumRef) -> Self {
        let master = match album.discogs_id {
            Some(discogs_id) => match catalog.master(discogs_id).await {
                Ok(master) => Some(master),
                Err(e) => {
                    warn!(album_id = album.album_id, discogs_id, "Master fetch failed: {}", e);
                    None
                }
            },
            None => None,
        };

        Self {
            catalog,
            config,
            album,
            master,
            main_release: None,
            alternate_release: None,
        }
    }

    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn main_release_id(&self) -> Option<i64> {
        self.master.as_ref().and_then(|m| m.main_release)
    }

    /// Fetch `id` and keep it only if its tracklist carries durations
    async fn fetch_release_with_durations(&self, id: i64) -> Option<Release> {
        let result = self.catalog.release(id).await;
        self.pause(self.config.release_pause).await;

        match result {
            Ok(release) if has_valid_durations(&release.tracklist) => Some(release),
            Ok(_) => {
                debug!(release_id = id, "Release has no tracklist durations");
                None
            }
            Err(e) => {
                warn!(release_id = id, "Release fetch failed: {}", e);
                None
            }
        }
    }

    async fn main_release(&mut self) -> Option<&Release> {
        if self.main_release.is_none() {
            let adopted = match self.main_release_id() {
                Some(id) => self.fetch_release_with_durations(id).await,
                None => None,
            };
            self.main_release = Some(adopted);
        }
        self.main_release.as_ref().and_then(|r| r.as_ref())
    }

    async fn alternate_release(&mut self) -> Option<&Release> {
        if self.main_release().await.is_some() {
            return None;
        }

        if self.alternate_release.is_none() {
            let adopted = self.walk_versions().await;
            self.alternate_release = Some(adopted);
        }
        self.alternate_release.as_ref().and_then(|r| r.as_ref())
    }

    async fn walk_versions(&self) -> Option<Release> {
        let master_id = self.master.as_ref()?.id;

        let versions = self.catalog.master_versions(master_id).await;
        self.pause(self.config.release_pause).await;

        let versions = match versions {
            Ok(list) => list.versions,
            Err(e) => {
                warn!(master_id, "Version list fetch failed: {}", e);
                return None;
            }
        };

        let main_release_id = self.main_release_id();
        for version in versions.iter().take(self.config.version_candidates) {
            if Some(version.id) == main_release_id {
                continue;
            }
            if let Some(release) = self.fetch_release_with_durations(version.id).await {
                debug!(master_id, release_id = version.id, "Adopted alternate version");
                return Some(release);
            }
        }

        None
    }

    /// Release whose tracklist is authoritative for this album, if any
    fn adopted_release(&self) -> Option<&Release> {
        let main = self.main_release.as_ref().and_then(|r| r.as_ref());
        let alternate = self.alternate_release.as_ref().and_then(|r| r.as_ref());
        main.or(alternate)
    }

    async fn search(&self, title: &str) -> Option<String> {
        let artist = self.album.artist_name.as_deref();
        let result = self.search_releases(title, artist).await;

        let pause = if self.album.discogs_id.is_some() {
            self.config.release_pause
        } else {
            self.config.album_pause
        };
        self.pause(pause).await;

        result
    }

    async fn search_releases(&self, title: &str, artist: Option<&str>) -> Option<String> {
        let results = match self.catalog.search_track(title, artist).await {
            Ok(results) => results.results,
            Err(e) => {
                warn!(track = %title, "Track search failed: {}", e);
                return None;
            }
        };

        for release_id in results
            .iter()
            .take(self.config.search_candidates)
            .filter_map(|r| r.id)
        {
            let release = self.catalog.release(release_id).await;
            self.pause(self.config.release_pause).await;

            match release {
                Ok(release) => {
                    if let Some(duration) = duration_from_tracklist(&release.tracklist, title) {
                        return Some(duration);
                    }
                }
                Err(e) => warn!(release_id, track = %title, "Search candidate fetch failed: {}", e),
            }
        }

        None
    }
}

/// Runs one reconciliation batch
pub struct DurationReconciler<'a> {
    catalog: &'a dyn Catalog,
    store: &'a dyn TrackStore,
    config: ReconcilerConfig,
}

impl<'a> DurationReconciler<'a> {
    pub fn new(catalog: &'a dyn Catalog, store: &'a dyn TrackStore, config: ReconcilerConfig) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    /// Reconcile every track currently missing a duration
    ///
    /// Catalog failures are logged and skipped. Store failures abort the run.
    pub async fn run(&self) -> discshelf_common::Result<ReconcileReport> {
        let pending = self.store.tracks_missing_duration().await?;
        let total = pending.len();

        if total == 0 {
            info!("No tracks with missing durations");
            return Ok(ReconcileReport::default());
        }

        let albums = group_by_album(pending);
        info!(tracks = total, albums = albums.len(), "Resyncing track durations");

        let mut updated = 0;
        for (album_id, tracks) in albums {
            let album = self
                .store
                .album_context(album_id)
                .await?
                .unwrap_or(AlbumRef {
                    album_id,
                    discogs_id: None,
                    artist_name: None,
                });

            let has_catalog_id = album.discogs_id.is_some();
            updated += self.reconcile_album(album, &tracks).await?;

            if has_catalog_id && !self.config.album_pause.is_zero() {
                tokio::time::sleep(self.config.album_pause).await;
            }
        }

        info!(updated, total, "Duration resync finished");
        Ok(ReconcileReport { updated, total })
    }

    async fn reconcile_album(
        &self,
        album: AlbumRef,
        tracks: &[PendingTrack],
    ) -> discshelf_common::Result<usize> {
        let album_id = album.album_id;
        let mut lookup = AlbumLookup::open(self.catalog, &self.config, album).await;
        let mut updated = 0;

        for track in tracks {
            // Tracklist matching and search use the stored title as is; only
            // the video source trims.
            let title = match track.title.as_deref() {
                Some(t) if !t.trim().is_empty() => t,
                _ => continue,
            };

            let mut resolved = None;
            for source in RESOLUTION_ORDER {
                if let Some(duration) = source.resolve(&mut lookup, title).await {
                    resolved = Some((source, duration));
                    break;
                }
            }

            match resolved {
                Some((source, duration)) => {
                    if self.store.persist_track_duration(track.track_id, &duration).await? {
                        updated += 1;
                        debug!(
                            album_id,
                            track_id = track.track_id,
                            track = %title,
                            duration = %duration,
                            source = source.name(),
                            "Track duration updated"
                        );
                    }
                }
                None => debug!(album_id, track_id = track.track_id, track = %title, "No duration found"),
            }
        }

        Ok(updated)
    }
}

/// Group tracks by album, keeping first-appearance order
fn group_by_album(tracks: Vec<PendingTrack>) -> Vec<(i64, Vec<PendingTrack>)> {
    let mut groups: Vec<(i64, Vec<PendingTrack>)> = Vec::new();
    for track in tracks {
        match groups.iter_mut().find(|(id, _)| *id == track.album_id) {
            Some((_, group)) => group.push(track),
            None => groups.push((track.album_id, vec![track])),
        }
    }
    groups
}
