//! Playable factory
//!
//! Turns provider-native items into playables, preserving order. Catalog
//! items either keep their catalog identity (`redirect = false`) or become
//! deferred playables whose stream the background loader fills in later
//! (`redirect = true`). Everything else already has a stream.

use chorus_core::types::{
    deferred, AudioTrack, CatalogItem, Episode, Playable, PlayableAudio, PlayableOrigin,
    PlaylistItem, StreamInfo, Track, UriDescriptor, UriKind, Video,
};
use chorus_core::{RedirectTask, TrackLoadingExecutor};
use std::sync::Arc;
use tracing::debug;

pub struct PlayableFactory {
    executor: Arc<dyn TrackLoadingExecutor>,
    catalog_scheme: String,
}

impl PlayableFactory {
    pub fn new(executor: Arc<dyn TrackLoadingExecutor>, catalog_scheme: impl Into<String>) -> Self {
        Self {
            executor,
            catalog_scheme: catalog_scheme.into(),
        }
    }

    /// Playable for a single catalog track or episode
    pub fn catalog_item(&self, item: CatalogItem, redirect: bool) -> Playable {
        if redirect {
            let (slot, audio) = deferred();
            self.executor.execute(RedirectTask {
                item: item.clone(),
                slot,
            });
            Playable::new(item.into(), PlayableAudio::Deferred(audio))
        } else {
            let kind = match &item {
                CatalogItem::Track(_) => UriKind::Track,
                CatalogItem::Episode(_) => UriKind::Episode,
            };
            let uri = UriDescriptor {
                kind,
                id: item.id().to_string(),
            }
            .format(&self.catalog_scheme);
            Playable::new(item.into(), PlayableAudio::Catalog { uri })
        }
    }

    /// Playables for an ordered catalog expansion
    pub fn catalog_items(&self, items: Vec<CatalogItem>, redirect: bool) -> Vec<Playable> {
        debug!(count = items.len(), redirect, "Creating catalog playables");
        items
            .into_iter()
            .map(|item| self.catalog_item(item, redirect))
            .collect()
    }

    pub fn tracks(&self, tracks: Vec<Track>, redirect: bool) -> Vec<Playable> {
        self.catalog_items(tracks.into_iter().map(CatalogItem::Track).collect(), redirect)
    }

    pub fn episodes(&self, episodes: Vec<Episode>, redirect: bool) -> Vec<Playable> {
        self.catalog_items(
            episodes.into_iter().map(CatalogItem::Episode).collect(),
            redirect,
        )
    }

    pub fn video(&self, video: Video) -> Playable {
        let stream = StreamInfo {
            url: video.url(),
            title: video.title.clone(),
            duration_ms: video.duration_ms,
        };
        Playable::new(PlayableOrigin::Video(video), PlayableAudio::Stream(stream))
    }

    pub fn videos(&self, videos: Vec<Video>) -> Vec<Playable> {
        videos.into_iter().map(|v| self.video(v)).collect()
    }

    /// Raw audio maps 1:1, no redirect step
    pub fn audio_track(&self, track: AudioTrack) -> Playable {
        let stream = StreamInfo {
            url: track.uri.clone(),
            title: track.title.clone(),
            duration_ms: track.duration_ms,
        };
        Playable::new(PlayableOrigin::Audio(track), PlayableAudio::Stream(stream))
    }

    /// Playables for a mixed item list (local playlists, URL targets)
    pub fn items(&self, items: Vec<PlaylistItem>, redirect: bool) -> Vec<Playable> {
        debug!(count = items.len(), redirect, "Creating playables for mixed items");
        items
            .into_iter()
            .map(|item| match item {
                PlaylistItem::Track(t) => self.catalog_item(CatalogItem::Track(t), redirect),
                PlaylistItem::Episode(e) => self.catalog_item(CatalogItem::Episode(e), redirect),
                PlaylistItem::Video(v) => self.video(v),
                PlaylistItem::Audio(a) => self.audio_track(a),
            })
            .collect()
    }
}
