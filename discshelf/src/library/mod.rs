//! Library browse views
//!
//! Pure transformations over stored rows: album filtering and sorting, artist
//! letter index, genre shelves.

use crate::db::albums::AlbumGridRow;
use discshelf_common::db::Artist;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group label for artists whose name does not start with A–Z
pub const OTHER_LETTER: &str = "#";

/// Genre label for albums without any genre
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Strip parentheses and digits (catalog disambiguation suffixes like "(2)")
pub fn sanitize_artist_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '(' | ')') && !c.is_ascii_digit())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Album,
    Artist,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string of `GET /api/albums`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumQuery {
    pub q: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
}

/// Sanitize artist names, filter by `q`, then sort
pub fn filter_and_sort(rows: Vec<AlbumGridRow>, query: &AlbumQuery) -> Vec<AlbumGridRow> {
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut rows: Vec<AlbumGridRow> = rows
        .into_iter()
        .map(|mut row| {
            row.artist_name = row.artist_name.as_deref().map(sanitize_artist_name);
            row
        })
        .filter(|row| match &needle {
            Some(needle) => {
                let title = row.title.as_deref().unwrap_or_default().to_lowercase();
                let artist = row.artist_name.as_deref().unwrap_or_default().to_lowercase();
                title.contains(needle) || artist.contains(needle)
            }
            None => true,
        })
        .collect();

    let key = |row: &AlbumGridRow| -> String {
        match query.sort {
            SortKey::Album => row.title.as_deref().unwrap_or_default().to_lowercase(),
            SortKey::Artist => row.artist_name.as_deref().unwrap_or_default().to_lowercase(),
        }
    };
    rows.sort_by_key(key);
    if query.order == SortOrder::Desc {
        rows.reverse();
    }

    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistGroup {
    pub letter: String,
    pub artists: Vec<Artist>,
}

fn index_letter(name: &str) -> String {
    match name.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some(c) if c.is_ascii_uppercase() => c.to_string(),
        _ => OTHER_LETTER.to_string(),
    }
}

/// Artists grouped by initial letter, A–Z then "#"
pub fn group_artists_by_letter(artists: Vec<Artist>) -> Vec<ArtistGroup> {
    let mut groups: BTreeMap<String, Vec<Artist>> = BTreeMap::new();
    for artist in artists {
        let letter = index_letter(artist.name.as_deref().unwrap_or_default().trim_start());
        groups.entry(letter).or_default().push(artist);
    }

    let mut groups: Vec<ArtistGroup> = groups
        .into_iter()
        .map(|(letter, mut artists)| {
            artists.sort_by_key(|a| a.name.as_deref().unwrap_or_default().to_lowercase());
            ArtistGroup { letter, artists }
        })
        .collect();

    // "#" sorts before letters in byte order
    if let Some(pos) = groups.iter().position(|g| g.letter == OTHER_LETTER) {
        let other = groups.remove(pos);
        groups.push(other);
    }

    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreGroup {
    pub genre: String,
    pub albums: Vec<AlbumGridRow>,
}

/// Genre names of a stored `genres` column
pub fn split_genres(genres: Option<&str>) -> Vec<String> {
    genres
        .unwrap_or_default()
        .split(',')
        .map(|g| g.trim().trim_start_matches('&').trim_start())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Albums shelved under each of their genres, genres sorted by name
pub fn group_albums_by_genre(rows: Vec<AlbumGridRow>) -> Vec<GenreGroup> {
    let mut groups: BTreeMap<String, Vec<AlbumGridRow>> = BTreeMap::new();
    for row in rows {
        let mut genres = split_genres(row.genres.as_deref());
        if genres.is_empty() {
            genres.push(UNKNOWN_GENRE.to_string());
        }
        genres.dedup();
        for genre in genres {
            groups.entry(genre).or_default().push(row.clone());
        }
    }

    groups
        .into_iter()
        .map(|(genre, albums)| GenreGroup { genre, albums })
        .collect()
}
