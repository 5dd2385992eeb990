//! Locally persisted playlist types

use super::catalog::{CatalogItem, Episode, Track};
use super::media::{AudioTrack, Video};
use serde::{Deserialize, Serialize};

/// Playlist saved in the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPlaylist {
    pub id: String,
    pub name: String,
    pub created_by: String,
}

/// Entry of a local playlist
///
/// Local playlists mix items from every provider; the order of the
/// stored list is the playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlaylistItem {
    Track(Track),
    Episode(Episode),
    Video(Video),
    Audio(AudioTrack),
}

impl From<CatalogItem> for PlaylistItem {
    fn from(item: CatalogItem) -> Self {
        match item {
            CatalogItem::Track(t) => Self::Track(t),
            CatalogItem::Episode(e) => Self::Episode(e),
        }
    }
}
