//! Resolution results

use super::catalog::{AlbumSummary, Episode, PlaylistSummary, ShowSummary, Track};
use super::local::LocalPlaylist;
use super::media::{AudioTrack, Video, VideoPlaylist};
use super::playable::Playable;

/// The concrete entity a successful resolution loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedEntity {
    LocalPlaylist(LocalPlaylist),
    VideoPlaylist(VideoPlaylist),
    Video(Video),
    CatalogPlaylist(PlaylistSummary),
    CatalogTrack(Track),
    CatalogAlbum(AlbumSummary),
    CatalogEpisode(Episode),
    CatalogShow(ShowSummary),
    PeerAudioTrack(AudioTrack),
    /// Whatever a direct URL pointed at
    Url(String),
}

impl LoadedEntity {
    /// Short name of the entity kind, for logs and messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LocalPlaylist(_) => "local playlist",
            Self::VideoPlaylist(_) => "video playlist",
            Self::Video(_) => "video",
            Self::CatalogPlaylist(_) => "catalog playlist",
            Self::CatalogTrack(_) => "catalog track",
            Self::CatalogAlbum(_) => "catalog album",
            Self::CatalogEpisode(_) => "catalog episode",
            Self::CatalogShow(_) => "catalog show",
            Self::PeerAudioTrack(_) => "peer audio track",
            Self::Url(_) => "url",
        }
    }

    /// Display name of the loaded entity
    pub fn name(&self) -> String {
        match self {
            Self::LocalPlaylist(p) => p.name.clone(),
            Self::VideoPlaylist(p) => p.title.clone(),
            Self::Video(v) => v.title.clone(),
            Self::CatalogPlaylist(p) => p.name.clone(),
            Self::CatalogTrack(t) => t.display(),
            Self::CatalogAlbum(a) => a.name.clone(),
            Self::CatalogEpisode(e) => e.display(),
            Self::CatalogShow(s) => s.name.clone(),
            Self::PeerAudioTrack(a) => a.title.clone(),
            Self::Url(url) => url.clone(),
        }
    }
}

/// A non-empty ordered playable sequence plus what it was loaded from
#[derive(Debug, Clone)]
pub struct Resolution {
    playables: Vec<Playable>,
    entity: LoadedEntity,
}

impl Resolution {
    /// Returns `None` for an empty sequence; a resolution always carries playables.
    pub fn new(playables: Vec<Playable>, entity: LoadedEntity) -> Option<Self> {
        if playables.is_empty() {
            None
        } else {
            Some(Self { playables, entity })
        }
    }

    pub fn playables(&self) -> &[Playable] {
        &self.playables
    }

    pub fn entity(&self) -> &LoadedEntity {
        &self.entity
    }

    pub fn loaded_amount(&self) -> usize {
        self.playables.len()
    }
}

/// How a single resolution ended
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Playables were produced
    Delivered(Resolution),
    /// The requester cancelled a disambiguation question or login wait
    Cancelled,
}

impl Outcome {
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Self::Delivered(resolution) => Some(resolution),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
