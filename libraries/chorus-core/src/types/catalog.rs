//! Streaming catalog types
//!
//! Provider-native results from the catalog service. Summaries are what
//! searches return; full track lists come from the expansion calls.

use serde::{Deserialize, Serialize};

/// Artist credited on a track or album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// Album a track belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
}

/// Show an episode belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRef {
    pub id: String,
    pub name: String,
}

/// Catalog track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
}

impl Track {
    /// Artist names joined with ", "
    pub fn artist_names(&self) -> String {
        join_names(self.artists.iter().map(|a| a.name.as_str()))
    }

    /// "Name by Artist, Artist"
    pub fn display(&self) -> String {
        if self.artists.is_empty() {
            self.name.clone()
        } else {
            format!("{} by {}", self.name, self.artist_names())
        }
    }
}

/// Catalog podcast episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub show: ShowRef,
    pub duration_ms: u64,
}

impl Episode {
    /// "Name by Show"
    pub fn display(&self) -> String {
        format!("{} by {}", self.name, self.show.name)
    }
}

/// Playlist as returned by a catalog playlist search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub track_count: u32,
}

/// Album as returned by a catalog album search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

impl AlbumSummary {
    pub fn artist_names(&self) -> String {
        join_names(self.artists.iter().map(|a| a.name.as_str()))
    }
}

/// Podcast show as returned by a catalog show search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

/// A catalog item that can stand as a playable on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatalogItem {
    Track(Track),
    Episode(Episode),
}

impl CatalogItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Track(t) => &t.id,
            Self::Episode(e) => &e.id,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Track(t) => t.display(),
            Self::Episode(e) => e.display(),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::Track(t) => t.duration_ms,
            Self::Episode(e) => e.duration_ms,
        }
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
