//! Track duration text helpers
//!
//! Durations are stored as free text in `M:SS` form. Catalog tracklists carry
//! the same text; videos carry whole seconds.

use crate::services::catalog::{TracklistEntry, Video};

/// Seconds → `M:SS` (minutes unpadded, seconds two digits)
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn is_blank(duration: Option<&str>) -> bool {
    duration.map(|d| d.trim().is_empty()).unwrap_or(true)
}

/// True if at least one entry carries a non-blank duration
pub fn has_valid_durations(tracklist: &[TracklistEntry]) -> bool {
    tracklist.iter().any(|t| !is_blank(t.duration.as_deref()))
}

/// Duration of the first tracklist entry titled `title` (case-insensitive)
/// that has a non-blank duration
pub fn duration_from_tracklist(tracklist: &[TracklistEntry], title: &str) -> Option<String> {
    let wanted = title.to_lowercase();
    tracklist
        .iter()
        .filter(|t| !is_blank(t.duration.as_deref()))
        .find(|t| t.title.to_lowercase() == wanted)
        .and_then(|t| t.duration.as_deref())
        .map(|d| d.trim().to_string())
}

/// Duration of the first video whose title contains the track title
///
/// The first video containing the title decides: if its duration is not
/// positive there is no match.
pub fn duration_from_videos(videos: &[Video], track_title: &str) -> Option<String> {
    let needle = track_title.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let video = videos
        .iter()
        .find(|v| v.title.to_lowercase().contains(&needle))?;

    if video.duration > 0 {
        Some(format_duration(video.duration as u64))
    } else {
        None
    }
}

/// Fill blank durations in `tracklist` from `videos`
pub fn fill_from_videos(tracklist: &[TracklistEntry], videos: &[Video]) -> Vec<TracklistEntry> {
    tracklist
        .iter()
        .map(|track| {
            if !is_blank(track.duration.as_deref()) {
                return track.clone();
            }
            match duration_from_videos(videos, &track.title) {
                Some(duration) => TracklistEntry {
                    duration: Some(duration),
                    ..track.clone()
                },
                None => track.clone(),
            }
        })
        .collect()
}
