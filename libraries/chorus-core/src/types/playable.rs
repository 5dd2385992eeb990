//! Playable units
//!
//! A `Playable` is what the resolver hands to the playback layer. Its audio
//! is either known up front, kept as a catalog identity for a player that
//! can consume catalog items directly, or deferred: a placeholder whose
//! stream is filled in later by a background loader.

use super::catalog::{CatalogItem, Episode, Track};
use super::media::{AudioTrack, Video};
use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Concrete stream the player can open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub url: String,
    pub title: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
enum DeferredState {
    Pending,
    Ready(StreamInfo),
    Failed(String),
}

/// Create a linked slot/handle pair for a stream that resolves later
///
/// The slot goes to whoever performs the lookup, the handle stays with the
/// playable. Dropping the slot without completing it marks the stream as
/// interrupted.
pub fn deferred() -> (DeferredSlot, DeferredAudio) {
    let (tx, rx) = watch::channel(DeferredState::Pending);
    (DeferredSlot { tx }, DeferredAudio { rx })
}

/// Write side of a deferred stream
pub struct DeferredSlot {
    tx: watch::Sender<DeferredState>,
}

impl DeferredSlot {
    /// Publish the resolved stream
    pub fn complete(self, stream: StreamInfo) {
        self.tx.send_replace(DeferredState::Ready(stream));
    }

    /// Publish a resolution failure
    pub fn fail(self, reason: impl Into<String>) {
        self.tx.send_replace(DeferredState::Failed(reason.into()));
    }

    /// Whether any playable still holds the read side
    pub fn is_wanted(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl fmt::Debug for DeferredSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredSlot").finish_non_exhaustive()
    }
}

/// Read side of a deferred stream
#[derive(Clone)]
pub struct DeferredAudio {
    rx: watch::Receiver<DeferredState>,
}

impl DeferredAudio {
    /// Current state without waiting
    ///
    /// `Ok(None)` while the loader is still working. Once the loader failed
    /// or went away the stream can never arrive, so this is `Unavailable`.
    pub fn current(&self) -> Result<Option<StreamInfo>> {
        let interrupted = self.rx.has_changed().is_err();
        match &*self.rx.borrow() {
            DeferredState::Ready(stream) => Ok(Some(stream.clone())),
            DeferredState::Failed(reason) => Err(ResolveError::unavailable(reason.clone())),
            DeferredState::Pending if interrupted => Err(ResolveError::unavailable(
                "background resolution was interrupted",
            )),
            DeferredState::Pending => Ok(None),
        }
    }

    /// Wait until the loader publishes a result
    pub async fn wait(&self) -> Result<StreamInfo> {
        let mut rx = self.rx.clone();
        let state = rx
            .wait_for(|state| !matches!(state, DeferredState::Pending))
            .await
            .map_err(|_| ResolveError::unavailable("background resolution was interrupted"))?;

        match &*state {
            DeferredState::Ready(stream) => Ok(stream.clone()),
            DeferredState::Failed(reason) => Err(ResolveError::unavailable(reason.clone())),
            DeferredState::Pending => Err(ResolveError::unavailable(
                "background resolution was interrupted",
            )),
        }
    }
}

impl fmt::Debug for DeferredAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.rx.borrow() {
            DeferredState::Pending => "pending",
            DeferredState::Ready(_) => "ready",
            DeferredState::Failed(_) => "failed",
        };
        f.debug_struct("DeferredAudio").field("state", &state).finish()
    }
}

/// Where a playable came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayableOrigin {
    CatalogTrack(Track),
    CatalogEpisode(Episode),
    Video(Video),
    Audio(AudioTrack),
}

impl From<CatalogItem> for PlayableOrigin {
    fn from(item: CatalogItem) -> Self {
        match item {
            CatalogItem::Track(t) => Self::CatalogTrack(t),
            CatalogItem::Episode(e) => Self::CatalogEpisode(e),
        }
    }
}

/// How the player gets at the audio of a playable
#[derive(Debug, Clone)]
pub enum PlayableAudio {
    /// Catalog identity, consumed directly by a catalog-capable player
    Catalog { uri: String },
    /// Stream known at resolution time
    Stream(StreamInfo),
    /// Stream filled in by the background loader
    Deferred(DeferredAudio),
}

/// What the player should open once a playable is due
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    Catalog { uri: String },
    Stream(StreamInfo),
}

/// Uniform output unit of a resolution
#[derive(Debug, Clone)]
pub struct Playable {
    origin: PlayableOrigin,
    audio: PlayableAudio,
}

impl Playable {
    pub fn new(origin: PlayableOrigin, audio: PlayableAudio) -> Self {
        Self { origin, audio }
    }

    pub fn origin(&self) -> &PlayableOrigin {
        &self.origin
    }

    pub fn audio(&self) -> &PlayableAudio {
        &self.audio
    }

    /// Provider-side identifier of the origin item
    pub fn id(&self) -> &str {
        match &self.origin {
            PlayableOrigin::CatalogTrack(t) => &t.id,
            PlayableOrigin::CatalogEpisode(e) => &e.id,
            PlayableOrigin::Video(v) => &v.id,
            PlayableOrigin::Audio(a) => &a.identifier,
        }
    }

    /// Human readable label
    pub fn display(&self) -> String {
        match &self.origin {
            PlayableOrigin::CatalogTrack(t) => t.display(),
            PlayableOrigin::CatalogEpisode(e) => e.display(),
            PlayableOrigin::Video(v) => v.title.clone(),
            PlayableOrigin::Audio(a) => format!("{} by {}", a.title, a.author),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match &self.origin {
            PlayableOrigin::CatalogTrack(t) => t.duration_ms,
            PlayableOrigin::CatalogEpisode(e) => e.duration_ms,
            PlayableOrigin::Video(v) => v.duration_ms,
            PlayableOrigin::Audio(a) => a.duration_ms,
        }
    }

    /// Whether the stream is filled in by the background loader
    pub fn is_deferred(&self) -> bool {
        matches!(self.audio, PlayableAudio::Deferred(_))
    }

    /// Current stream without waiting
    ///
    /// `Ok(None)` for catalog identities and for deferred streams that are
    /// still loading. Fails with `Unavailable` when a deferred stream can
    /// no longer arrive.
    pub fn stream(&self) -> Result<Option<StreamInfo>> {
        match &self.audio {
            PlayableAudio::Catalog { .. } => Ok(None),
            PlayableAudio::Stream(stream) => Ok(Some(stream.clone())),
            PlayableAudio::Deferred(deferred) => deferred.current(),
        }
    }

    /// Wait for whatever the player needs to open this playable
    pub async fn playback_target(&self) -> Result<PlaybackTarget> {
        match &self.audio {
            PlayableAudio::Catalog { uri } => Ok(PlaybackTarget::Catalog { uri: uri.clone() }),
            PlayableAudio::Stream(stream) => Ok(PlaybackTarget::Stream(stream.clone())),
            PlayableAudio::Deferred(deferred) => deferred.wait().await.map(PlaybackTarget::Stream),
        }
    }
}
