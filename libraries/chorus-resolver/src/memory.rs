//! In-memory providers backed by a JSON fixture
//!
//! Implements every collaborator trait over a static catalog so the
//! resolver can run without network services (demo CLI, tests). Every
//! provider call is recorded together with the credential mode and limit
//! it ran with.
//!
//! ```json
//! {
//!   "tracks": [{ "id": "t1", "name": "Imagine", "artists": [...], "duration_ms": 183000, "saved": true }],
//!   "playlists": [{ "id": "p1", "name": "Top Hits", "owner": "dj", "items": ["t1"] }],
//!   "peer_audio": { "scsearch:lofi": { "type": "collection", ... } },
//!   "local_playlists": [{ "scope": "guild-1", "id": "l1", "name": "Chill", "created_by": "u1", "items": [...] }],
//!   "logins": [{ "requester": "u1", "access_token": "..." }]
//! }
//! ```

use crate::gate::Disambiguator;
use crate::resolver::Collaborators;
use async_trait::async_trait;
use chorus_core::types::{
    AlbumSummary, AudioItem, CatalogItem, CredentialContext, Episode, LocalPlaylist, Login,
    PlaylistItem, PlaylistSummary, RequesterId, ScopeId, ShowSummary, StreamInfo, Track, Video,
    VideoPlaylist,
};
use chorus_core::{
    CatalogProvider, InputSyntax, LocalPlaylistStore, LoginProvider, PeerAudioProvider,
    Redirector, ResolveError, Result, TrackLoadingExecutor, UrlLoader, VideoProvider,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

const PROVIDER: &str = "memory";

#[derive(Debug, Clone, Deserialize)]
struct Saved<T> {
    #[serde(flatten)]
    item: T,
    #[serde(default)]
    saved: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureAlbum {
    #[serde(flatten)]
    summary: AlbumSummary,
    #[serde(default)]
    tracks: Vec<String>,
    #[serde(default)]
    saved: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct FixturePlaylist {
    #[serde(flatten)]
    summary: PlaylistSummary,
    #[serde(default)]
    items: Vec<String>,
    /// Requester whose own library contains the playlist
    #[serde(default)]
    owned_by: Option<RequesterId>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureShow {
    #[serde(flatten)]
    summary: ShowSummary,
    #[serde(default)]
    episodes: Vec<String>,
    #[serde(default)]
    saved: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureVideoPlaylist {
    #[serde(flatten)]
    summary: VideoPlaylist,
    #[serde(default)]
    videos: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureLocalPlaylist {
    scope: ScopeId,
    #[serde(flatten)]
    playlist: LocalPlaylist,
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    tracks: Vec<Saved<Track>>,
    #[serde(default)]
    albums: Vec<FixtureAlbum>,
    #[serde(default)]
    playlists: Vec<FixturePlaylist>,
    #[serde(default)]
    episodes: Vec<Saved<Episode>>,
    #[serde(default)]
    shows: Vec<FixtureShow>,
    #[serde(default)]
    videos: Vec<Video>,
    #[serde(default)]
    video_playlists: Vec<FixtureVideoPlaylist>,
    #[serde(default)]
    peer_audio: BTreeMap<String, AudioItem>,
    #[serde(default)]
    local_playlists: Vec<FixtureLocalPlaylist>,
    #[serde(default)]
    urls: BTreeMap<String, Vec<PlaylistItem>>,
    #[serde(default)]
    logins: Vec<Login>,
}

/// Credential mode a recorded call ran under
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallCredentials {
    Shared,
    Requester(RequesterId),
    /// Calls that take no credential context
    None,
}

impl From<&CredentialContext> for CallCredentials {
    fn from(ctx: &CredentialContext) -> Self {
        match ctx {
            CredentialContext::Shared => Self::Shared,
            CredentialContext::Requester(login) => Self::Requester(login.requester.clone()),
        }
    }
}

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub method: &'static str,
    pub argument: String,
    pub credentials: CallCredentials,
    pub limit: Option<usize>,
}

/// Fixture-backed implementation of every collaborator trait
#[derive(Debug, Default)]
pub struct MemoryProviders {
    fixture: Fixture,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MemoryProviders {
    /// Parse a JSON fixture
    ///
    /// # Errors
    /// `Serialization` when the document does not match the fixture format.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        Ok(Self {
            fixture,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Calls made so far, oldest first
    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().await.clone()
    }

    /// Wire these providers into a resolver
    pub fn collaborators(
        self: &Arc<Self>,
        syntax: Arc<dyn InputSyntax>,
        executor: Arc<dyn TrackLoadingExecutor>,
        disambiguator: Arc<dyn Disambiguator>,
    ) -> Collaborators {
        Collaborators {
            syntax,
            catalog: self.clone(),
            video: self.clone(),
            peer_audio: self.clone(),
            local: self.clone(),
            urls: self.clone(),
            logins: self.clone(),
            executor,
            disambiguator,
        }
    }

    async fn record(
        &self,
        method: &'static str,
        argument: &str,
        credentials: CallCredentials,
        limit: Option<usize>,
    ) {
        trace!(method, argument, ?credentials, ?limit, "Provider call");
        self.calls.lock().await.push(ProviderCall {
            method,
            argument: argument.to_string(),
            credentials,
            limit,
        });
    }

    fn requester<'a>(ctx: &'a CredentialContext, what: &str) -> Result<&'a RequesterId> {
        ctx.login().map(|login| &login.requester).ok_or_else(|| {
            ResolveError::AuthenticationRequired(format!("{} needs a requester login", what))
        })
    }

    fn track(&self, id: &str) -> Option<&Track> {
        self.fixture
            .tracks
            .iter()
            .map(|t| &t.item)
            .find(|t| t.id == id)
    }

    fn episode(&self, id: &str) -> Option<&Episode> {
        self.fixture
            .episodes
            .iter()
            .map(|e| &e.item)
            .find(|e| e.id == id)
    }

    fn video(&self, id: &str) -> Option<&Video> {
        self.fixture.videos.iter().find(|v| v.id == id)
    }

    fn unknown(kind: &str, id: &str) -> ResolveError {
        ResolveError::provider(PROVIDER, format!("fixture has no {} '{}'", kind, id))
    }
}

fn matches(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(&query.trim().to_lowercase())
}

fn track_matches(track: &Track, query: &str) -> bool {
    matches(&track.name, query) || matches(&track.display(), query)
}

#[async_trait]
impl CatalogProvider for MemoryProviders {
    async fn search_playlist(
        &self,
        ctx: &CredentialContext,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaylistSummary>> {
        self.record("search_playlist", query, ctx.into(), Some(limit))
            .await;
        Ok(self
            .fixture
            .playlists
            .iter()
            .filter(|p| matches(&p.summary.name, query))
            .take(limit)
            .map(|p| p.summary.clone())
            .collect())
    }

    async fn search_own_playlist(
        &self,
        ctx: &CredentialContext,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaylistSummary>> {
        self.record("search_own_playlist", query, ctx.into(), Some(limit))
            .await;
        let requester = Self::requester(ctx, "Searching own playlists")?;
        Ok(self
            .fixture
            .playlists
            .iter()
            .filter(|p| p.owned_by.as_ref() == Some(requester))
            .filter(|p| matches(&p.summary.name, query))
            .take(limit)
            .map(|p| p.summary.clone())
            .collect())
    }

    async fn search_track(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<Track>> {
        self.record("search_track", query, ctx.into(), Some(limit))
            .await;
        if own {
            Self::requester(ctx, "Searching saved tracks")?;
        }
        Ok(self
            .fixture
            .tracks
            .iter()
            .filter(|t| !own || t.saved)
            .map(|t| &t.item)
            .filter(|t| track_matches(t, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_album(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<AlbumSummary>> {
        self.record("search_album", query, ctx.into(), Some(limit))
            .await;
        if own {
            Self::requester(ctx, "Searching saved albums")?;
        }
        Ok(self
            .fixture
            .albums
            .iter()
            .filter(|a| !own || a.saved)
            .filter(|a| matches(&a.summary.name, query))
            .take(limit)
            .map(|a| a.summary.clone())
            .collect())
    }

    async fn search_episode(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<Episode>> {
        self.record("search_episode", query, ctx.into(), Some(limit))
            .await;
        if own {
            Self::requester(ctx, "Searching saved episodes")?;
        }
        Ok(self
            .fixture
            .episodes
            .iter()
            .filter(|e| !own || e.saved)
            .map(|e| &e.item)
            .filter(|e| matches(&e.name, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_show(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<ShowSummary>> {
        self.record("search_show", query, ctx.into(), Some(limit))
            .await;
        if own {
            Self::requester(ctx, "Searching saved shows")?;
        }
        Ok(self
            .fixture
            .shows
            .iter()
            .filter(|s| !own || s.saved)
            .filter(|s| matches(&s.summary.name, query))
            .take(limit)
            .map(|s| s.summary.clone())
            .collect())
    }

    async fn get_playlist_tracks(
        &self,
        ctx: &CredentialContext,
        playlist_id: &str,
    ) -> Result<Vec<CatalogItem>> {
        self.record("get_playlist_tracks", playlist_id, ctx.into(), None)
            .await;
        let playlist = self
            .fixture
            .playlists
            .iter()
            .find(|p| p.summary.id == playlist_id)
            .ok_or_else(|| Self::unknown("playlist", playlist_id))?;

        playlist
            .items
            .iter()
            .map(|id| {
                self.track(id)
                    .cloned()
                    .map(CatalogItem::Track)
                    .or_else(|| self.episode(id).cloned().map(CatalogItem::Episode))
                    .ok_or_else(|| Self::unknown("playlist item", id))
            })
            .collect()
    }

    async fn get_album_tracks(
        &self,
        ctx: &CredentialContext,
        album_id: &str,
    ) -> Result<Vec<Track>> {
        self.record("get_album_tracks", album_id, ctx.into(), None)
            .await;
        let album = self
            .fixture
            .albums
            .iter()
            .find(|a| a.summary.id == album_id)
            .ok_or_else(|| Self::unknown("album", album_id))?;

        album
            .tracks
            .iter()
            .map(|id| {
                self.track(id)
                    .cloned()
                    .ok_or_else(|| Self::unknown("track", id))
            })
            .collect()
    }

    async fn get_show_episodes(
        &self,
        ctx: &CredentialContext,
        show_id: &str,
    ) -> Result<Vec<Episode>> {
        self.record("get_show_episodes", show_id, ctx.into(), None)
            .await;
        let show = self
            .fixture
            .shows
            .iter()
            .find(|s| s.summary.id == show_id)
            .ok_or_else(|| Self::unknown("show", show_id))?;

        show.episodes
            .iter()
            .map(|id| {
                self.episode(id)
                    .cloned()
                    .ok_or_else(|| Self::unknown("episode", id))
            })
            .collect()
    }

    async fn get_track(&self, ctx: &CredentialContext, id: &str) -> Result<Option<Track>> {
        self.record("get_track", id, ctx.into(), None).await;
        Ok(self.track(id).cloned())
    }

    async fn get_album(&self, ctx: &CredentialContext, id: &str) -> Result<Option<AlbumSummary>> {
        self.record("get_album", id, ctx.into(), None).await;
        Ok(self
            .fixture
            .albums
            .iter()
            .find(|a| a.summary.id == id)
            .map(|a| a.summary.clone()))
    }

    async fn get_playlist(
        &self,
        ctx: &CredentialContext,
        id: &str,
    ) -> Result<Option<PlaylistSummary>> {
        self.record("get_playlist", id, ctx.into(), None).await;
        Ok(self
            .fixture
            .playlists
            .iter()
            .find(|p| p.summary.id == id)
            .map(|p| p.summary.clone()))
    }

    async fn get_episode(&self, ctx: &CredentialContext, id: &str) -> Result<Option<Episode>> {
        self.record("get_episode", id, ctx.into(), None).await;
        Ok(self.episode(id).cloned())
    }

    async fn get_show(&self, ctx: &CredentialContext, id: &str) -> Result<Option<ShowSummary>> {
        self.record("get_show", id, ctx.into(), None).await;
        Ok(self
            .fixture
            .shows
            .iter()
            .find(|s| s.summary.id == id)
            .map(|s| s.summary.clone()))
    }
}

#[async_trait]
impl VideoProvider for MemoryProviders {
    async fn search_playlist(&self, query: &str) -> Result<Option<VideoPlaylist>> {
        self.record("search_video_playlist", query, CallCredentials::None, None)
            .await;
        Ok(self
            .fixture
            .video_playlists
            .iter()
            .find(|p| matches(&p.summary.title, query))
            .map(|p| p.summary.clone()))
    }

    async fn search_several_playlists(
        &self,
        limit: usize,
        query: &str,
    ) -> Result<Vec<VideoPlaylist>> {
        self.record(
            "search_several_video_playlists",
            query,
            CallCredentials::None,
            Some(limit),
        )
        .await;
        Ok(self
            .fixture
            .video_playlists
            .iter()
            .filter(|p| matches(&p.summary.title, query))
            .take(limit)
            .map(|p| p.summary.clone())
            .collect())
    }

    async fn search_video(&self, query: &str) -> Result<Option<Video>> {
        self.record("search_video", query, CallCredentials::None, None)
            .await;
        Ok(self
            .fixture
            .videos
            .iter()
            .find(|v| matches(&v.title, query))
            .cloned())
    }

    async fn search_several_videos(&self, limit: usize, query: &str) -> Result<Vec<Video>> {
        self.record(
            "search_several_videos",
            query,
            CallCredentials::None,
            Some(limit),
        )
        .await;
        Ok(self
            .fixture
            .videos
            .iter()
            .filter(|v| matches(&v.title, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn playlist_videos(&self, playlist_id: &str) -> Result<Vec<Video>> {
        self.record("playlist_videos", playlist_id, CallCredentials::None, None)
            .await;
        let playlist = self
            .fixture
            .video_playlists
            .iter()
            .find(|p| p.summary.id == playlist_id)
            .ok_or_else(|| Self::unknown("video playlist", playlist_id))?;

        playlist
            .videos
            .iter()
            .map(|id| {
                self.video(id)
                    .cloned()
                    .ok_or_else(|| Self::unknown("video", id))
            })
            .collect()
    }
}

#[async_trait]
impl PeerAudioProvider for MemoryProviders {
    async fn load_item(&self, identifier: &str) -> Result<Option<AudioItem>> {
        self.record("load_item", identifier, CallCredentials::None, None)
            .await;
        Ok(self.fixture.peer_audio.get(identifier).cloned())
    }
}

#[async_trait]
impl LocalPlaylistStore for MemoryProviders {
    async fn find_playlist(&self, scope: &ScopeId, name: &str) -> Result<Option<LocalPlaylist>> {
        self.record("find_playlist", name, CallCredentials::None, None)
            .await;
        let name = name.trim().to_lowercase();
        Ok(self
            .fixture
            .local_playlists
            .iter()
            .find(|p| &p.scope == scope && p.playlist.name.to_lowercase() == name)
            .map(|p| p.playlist.clone()))
    }

    async fn playlist_items(
        &self,
        playlist: &LocalPlaylist,
        ctx: &CredentialContext,
    ) -> Result<Vec<PlaylistItem>> {
        self.record("local_playlist_items", &playlist.id, ctx.into(), None)
            .await;
        self.fixture
            .local_playlists
            .iter()
            .find(|p| p.playlist.id == playlist.id)
            .map(|p| p.items.clone())
            .ok_or_else(|| Self::unknown("local playlist", &playlist.id))
    }
}

#[async_trait]
impl UrlLoader for MemoryProviders {
    async fn load_url(&self, url: &str, ctx: &CredentialContext) -> Result<Vec<PlaylistItem>> {
        self.record("load_url", url, ctx.into(), None).await;
        Ok(self.fixture.urls.get(url).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl LoginProvider for MemoryProviders {
    async fn await_login(&self, requester: &RequesterId) -> Result<Option<Login>> {
        self.record(
            "await_login",
            requester.as_str(),
            CallCredentials::None,
            None,
        )
        .await;
        Ok(self
            .fixture
            .logins
            .iter()
            .find(|l| &l.requester == requester)
            .cloned())
    }
}

/// Redirects catalog items to the first fixture video whose title mentions them
#[async_trait]
impl Redirector for MemoryProviders {
    async fn redirect(&self, item: &CatalogItem) -> Result<Option<StreamInfo>> {
        let name = match item {
            CatalogItem::Track(t) => &t.name,
            CatalogItem::Episode(e) => &e.name,
        };
        self.record("redirect", item.id(), CallCredentials::None, None)
            .await;

        Ok(self
            .fixture
            .videos
            .iter()
            .find(|v| matches(&v.title, name))
            .map(|v| StreamInfo {
                url: v.url(),
                title: v.title.clone(),
                duration_ms: v.duration_ms,
            }))
    }
}
