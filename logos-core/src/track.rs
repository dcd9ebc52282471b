//! Search result model shared by every provider.

use serde::{Deserialize, Serialize};

use crate::text::{normalize_artist, normalize_title};

/// A song discovered by a provider's search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display title
    #[serde(rename = "track_name")]
    pub title: String,
    /// Display artist name
    #[serde(rename = "artist_name")]
    pub artist: String,
    /// Identifier only the producing provider understands (a full song page URL,
    /// or a composite token such as `id|checksum`). Callers must not parse it.
    #[serde(rename = "track_id")]
    pub opaque_id: String,
    /// Name of the provider that produced this track
    pub source: String,
}

impl Track {
    /// Create a new track
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        opaque_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            opaque_id: opaque_id.into(),
            source: source.into(),
        }
    }

    /// Normalized (artist, title) pair used to collapse duplicates across providers.
    ///
    /// Returns `None` when either half normalizes to an empty string; such tracks
    /// never take part in a search result.
    #[must_use]
    pub fn dedup_key(&self) -> Option<DedupKey> {
        let artist = normalize_artist(&self.artist);
        let title = normalize_title(&self.title);
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        Some(DedupKey { artist, title })
    }
}

/// Derived identity of a song, independent of which provider found it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub artist: String,
    pub title: String,
}

/// Tracks by one artist, in the order they were merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistGroup {
    /// Artist name as displayed by the first track seen for this artist
    pub artist_name: String,
    pub tracks: Vec<Track>,
}
