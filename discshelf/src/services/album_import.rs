//! Album import
//!
//! Saves a catalog master chosen by the user. When the master's tracklist has
//! no durations, the main release and a few alternate versions are consulted,
//! with video lengths as a last resort.

use crate::db::albums::{save_album, NewAlbum};
use crate::services::catalog::{Catalog, Master, TracklistEntry, Video};
use crate::services::duration::{fill_from_videos, has_valid_durations};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// Versions consulted when enriching an import
pub const IMPORT_VERSION_CANDIDATES: usize = 5;

/// Body of `POST /api/album`: a master record plus the chosen cover
#[derive(Debug, Clone, Deserialize)]
pub struct ImportAlbumRequest {
    #[serde(flatten)]
    pub master: Master,
    #[serde(rename = "selectedImageUrl", default)]
    pub selected_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPayload {
    #[serde(flatten)]
    pub album: NewAlbum,
    pub artist_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedAlbum {
    pub album: AlbumPayload,
    pub album_id: i64,
}

/// Tracklist to store for `master`, with durations filled where possible
pub async fn enrich_tracklist(
    catalog: &dyn Catalog,
    master: &Master,
    max_versions: usize,
) -> Vec<TracklistEntry> {
    if has_valid_durations(&master.tracklist) {
        return master.tracklist.clone();
    }

    let mut videos: Vec<Video> = master.videos.clone();

    if let Some(main_release) = master.main_release {
        match catalog.release(main_release).await {
            Ok(release) if has_valid_durations(&release.tracklist) => {
                debug!(master_id = master.id, release_id = main_release, "Using main release tracklist");
                return release.tracklist;
            }
            Ok(release) => {
                if !release.videos.is_empty() {
                    videos = release.videos;
                }
            }
            Err(e) => warn!(release_id = main_release, "Error fetching main release: {}", e),
        }
    }

    match catalog.master_versions(master.id).await {
        Ok(list) => {
            for version in list.versions.iter().take(max_versions) {
                if Some(version.id) == master.main_release {
                    continue;
                }
                match catalog.release(version.id).await {
                    Ok(release) if has_valid_durations(&release.tracklist) => {
                        debug!(master_id = master.id, release_id = version.id, "Using version tracklist");
                        return release.tracklist;
                    }
                    Ok(release) => {
                        if videos.is_empty() && !release.videos.is_empty() {
                            videos = release.videos;
                        }
                    }
                    Err(e) => warn!(release_id = version.id, "Error fetching version: {}", e),
                }
            }
        }
        Err(e) => warn!(master_id = master.id, "Error fetching versions: {}", e),
    }

    if videos.is_empty() {
        master.tracklist.clone()
    } else {
        fill_from_videos(&master.tracklist, &videos)
    }
}

/// Selected image, else the primary image, else the first one, else ""
pub fn select_image_url(master: &Master, selected: Option<&str>) -> String {
    if let Some(url) = selected.filter(|u| !u.is_empty()) {
        return url.to_string();
    }

    master
        .images
        .iter()
        .find(|image| image.kind == "primary")
        .or_else(|| master.images.first())
        .map(|image| image.uri.clone())
        .unwrap_or_default()
}

/// Enrich and save `request`
pub async fn import_album(
    pool: &SqlitePool,
    catalog: &dyn Catalog,
    request: ImportAlbumRequest,
) -> discshelf_common::Result<ImportedAlbum> {
    let master = &request.master;
    let tracklist = enrich_tracklist(catalog, master, IMPORT_VERSION_CANDIDATES).await;

    let album = NewAlbum {
        title: master.title.clone(),
        year: master.year_text(),
        discogs_id: Some(master.id),
        genres: master.genres.join(", "),
        styles: master.styles.join(", "),
        image_url: select_image_url(master, request.selected_image_url.as_deref()),
    };

    let saved = save_album(pool, &album, &master.artists, &tracklist).await?;

    Ok(ImportedAlbum {
        album: AlbumPayload {
            album,
            artist_id: saved.artist_id,
        },
        album_id: saved.album_id,
    })
}
