//! Collaborator traits for Chorus
//!
//! The resolver talks to every content provider, the local playlist store,
//! the login manager and the background loader only through these traits.
use crate::error::Result;
use crate::types::{
    AlbumSummary, AudioItem, CatalogItem, CredentialContext, DeferredSlot, Episode, LocalPlaylist,
    Login, PlaylistItem, PlaylistSummary, RequesterId, ScopeId, ShowSummary, StreamInfo, Track,
    UriDescriptor, Video, VideoPlaylist,
};
use async_trait::async_trait;

/// Syntax checks on raw input
///
/// Implementers decide what counts as an absolute URL and as a provider URI.
pub trait InputSyntax: Send + Sync {
    /// Whether the input is an absolute URL
    fn is_absolute_url(&self, input: &str) -> bool;

    /// Whether the input is a provider URI
    fn is_provider_uri(&self, input: &str) -> bool;

    /// Parse a provider URI
    ///
    /// # Errors
    /// Returns `InvalidInput` if the input is not a provider URI
    fn parse_provider_uri(&self, input: &str) -> Result<UriDescriptor>;

    /// Scheme used when rendering catalog identities as URIs
    fn catalog_scheme(&self) -> &str;
}

/// Streaming catalog service
///
/// Every call takes the credential context it runs under. Search results
/// are ordered by relevance and bounded by `limit`; expansions keep the
/// catalog's declared order.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search public playlists
    async fn search_playlist(
        &self,
        ctx: &CredentialContext,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaylistSummary>>;

    /// Search the requester's own playlists
    async fn search_own_playlist(
        &self,
        ctx: &CredentialContext,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaylistSummary>>;

    /// Search tracks, restricted to the requester's library when `own` is set
    async fn search_track(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<Track>>;

    /// Search albums
    async fn search_album(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<AlbumSummary>>;

    /// Search podcast episodes
    async fn search_episode(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<Episode>>;

    /// Search podcast shows
    async fn search_show(
        &self,
        ctx: &CredentialContext,
        query: &str,
        own: bool,
        limit: usize,
    ) -> Result<Vec<ShowSummary>>;

    /// All items of a playlist, in playlist order
    async fn get_playlist_tracks(
        &self,
        ctx: &CredentialContext,
        playlist_id: &str,
    ) -> Result<Vec<CatalogItem>>;

    /// All tracks of an album, in album order
    async fn get_album_tracks(&self, ctx: &CredentialContext, album_id: &str)
        -> Result<Vec<Track>>;

    /// All episodes of a show, in show order
    async fn get_show_episodes(
        &self,
        ctx: &CredentialContext,
        show_id: &str,
    ) -> Result<Vec<Episode>>;

    // Lookups by id, used for provider URIs

    async fn get_track(&self, ctx: &CredentialContext, id: &str) -> Result<Option<Track>>;

    async fn get_album(&self, ctx: &CredentialContext, id: &str) -> Result<Option<AlbumSummary>>;

    async fn get_playlist(
        &self,
        ctx: &CredentialContext,
        id: &str,
    ) -> Result<Option<PlaylistSummary>>;

    async fn get_episode(&self, ctx: &CredentialContext, id: &str) -> Result<Option<Episode>>;

    async fn get_show(&self, ctx: &CredentialContext, id: &str) -> Result<Option<ShowSummary>>;
}

/// Video search service
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Best matching playlist
    async fn search_playlist(&self, query: &str) -> Result<Option<VideoPlaylist>>;

    /// Up to `limit` matching playlists
    async fn search_several_playlists(&self, limit: usize, query: &str)
        -> Result<Vec<VideoPlaylist>>;

    /// Best matching video
    async fn search_video(&self, query: &str) -> Result<Option<Video>>;

    /// Up to `limit` matching videos
    async fn search_several_videos(&self, limit: usize, query: &str) -> Result<Vec<Video>>;

    /// Videos of a playlist, in playlist order
    async fn playlist_videos(&self, playlist_id: &str) -> Result<Vec<Video>>;
}

/// Peer-hosted audio service
#[async_trait]
pub trait PeerAudioProvider: Send + Sync {
    /// Load a single track, a collection, or nothing for an identifier
    async fn load_item(&self, identifier: &str) -> Result<Option<AudioItem>>;
}

/// Store of locally persisted playlists
#[async_trait]
pub trait LocalPlaylistStore: Send + Sync {
    /// Keyed lookup of a playlist by name within a scope
    async fn find_playlist(&self, scope: &ScopeId, name: &str) -> Result<Option<LocalPlaylist>>;

    /// Items of a playlist, in stored order
    ///
    /// May call providers to refresh items, and fails the way they fail.
    async fn playlist_items(
        &self,
        playlist: &LocalPlaylist,
        ctx: &CredentialContext,
    ) -> Result<Vec<PlaylistItem>>;
}

/// Loader for direct URLs
#[async_trait]
pub trait UrlLoader: Send + Sync {
    /// Raw items behind a URL, in the order the target lists them
    async fn load_url(&self, url: &str, ctx: &CredentialContext) -> Result<Vec<PlaylistItem>>;
}

/// Login state of requesters with the catalog service
#[async_trait]
pub trait LoginProvider: Send + Sync {
    /// Wait for the requester's login
    ///
    /// May block while a login flow is in progress. `None` means the
    /// requester has not logged in.
    async fn await_login(&self, requester: &RequesterId) -> Result<Option<Login>>;
}

/// Finds a streamable equivalent of a catalog item
#[async_trait]
pub trait Redirector: Send + Sync {
    async fn redirect(&self, item: &CatalogItem) -> Result<Option<StreamInfo>>;
}

/// Background resolution of a catalog item into a stream
#[derive(Debug)]
pub struct RedirectTask {
    pub item: CatalogItem,
    pub slot: DeferredSlot,
}

/// Background loading facility for deferred playables
///
/// `execute` must not block; the task's slot is completed later.
pub trait TrackLoadingExecutor: Send + Sync {
    fn execute(&self, task: RedirectTask);
}
