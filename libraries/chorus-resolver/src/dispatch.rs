//! Resolution dispatcher
//!
//! Issues the bounded search or lookup for a classified request and sorts
//! the result by cardinality. Each catalog call picks its own credential
//! context right before it goes out.

use crate::config::ResolverConfig;
use crate::credentials::CredentialSelector;
use crate::resolver::ResolveRequest;
use chorus_core::types::{
    flags, AlbumSummary, AudioItem, CatalogItem, CommandInput, CredentialContext, Episode,
    LocalPlaylist, PlaylistItem, PlaylistSummary, ShowSummary, Source, Track, Video,
    VideoPlaylist,
};
use chorus_core::{
    CatalogProvider, LocalPlaylistStore, PeerAudioProvider, ResolveError, Result, UrlLoader,
    VideoProvider,
};
use std::sync::Arc;
use tracing::debug;

/// A non-empty candidate list, split by size
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality<T> {
    One(T),
    Many(Vec<T>),
}

/// Sort candidates by count; zero candidates is the supplied not-found error
pub fn cardinality<T>(
    mut found: Vec<T>,
    not_found: impl FnOnce() -> ResolveError,
) -> Result<Cardinality<T>> {
    match found.len() {
        0 => Err(not_found()),
        1 => Ok(Cardinality::One(found.remove(0))),
        _ => Ok(Cardinality::Many(found)),
    }
}

/// Default result limit of a source
pub fn default_limit(config: &ResolverConfig, source: Source) -> usize {
    match source {
        Source::VideoList | Source::VideoSingle => config.video_search_limit,
        Source::PeerAudio => config.peer_audio_limit,
        _ => config.catalog_search_limit,
    }
}

/// Effective limit: the `select` value if given, else the source default
///
/// # Errors
/// `InvalidInput` for a non-numeric or zero `select` value.
pub fn limit(input: &CommandInput, default: usize) -> Result<usize> {
    match input.arguments().value_as::<usize>(flags::SELECT)? {
        Some(0) => Err(ResolveError::invalid_input(
            "The select limit must be at least 1",
        )),
        Some(limit) => Ok(limit),
        None => Ok(default),
    }
}

/// Best match for a track query among several results
///
/// Exact title match first, then exact "title by artist", then the
/// provider's own ranking.
pub fn best_track_match(query: &str, mut tracks: Vec<Track>) -> Option<Track> {
    let query = query.trim().to_lowercase();
    let position = tracks
        .iter()
        .position(|t| t.name.to_lowercase() == query)
        .or_else(|| {
            tracks
                .iter()
                .position(|t| t.display().to_lowercase() == query)
        })
        .unwrap_or(0);

    if tracks.is_empty() {
        None
    } else {
        Some(tracks.swap_remove(position))
    }
}

pub struct Dispatcher {
    catalog: Arc<dyn CatalogProvider>,
    video: Arc<dyn VideoProvider>,
    peer_audio: Arc<dyn PeerAudioProvider>,
    local: Arc<dyn LocalPlaylistStore>,
    urls: Arc<dyn UrlLoader>,
    credentials: CredentialSelector,
    config: Arc<ResolverConfig>,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        video: Arc<dyn VideoProvider>,
        peer_audio: Arc<dyn PeerAudioProvider>,
        local: Arc<dyn LocalPlaylistStore>,
        urls: Arc<dyn UrlLoader>,
        credentials: CredentialSelector,
        config: Arc<ResolverConfig>,
    ) -> Self {
        Self {
            catalog,
            video,
            peer_audio,
            local,
            urls,
            credentials,
            config,
        }
    }

    pub fn catalog(&self) -> &dyn CatalogProvider {
        self.catalog.as_ref()
    }

    pub fn credentials(&self) -> &CredentialSelector {
        &self.credentials
    }

    fn limit_for(&self, request: &ResolveRequest, source: Source) -> Result<usize> {
        limit(&request.input, default_limit(&self.config, source))
    }

    async fn context(&self, request: &ResolveRequest) -> Result<CredentialContext> {
        self.credentials
            .select(
                request.input.is_set(flags::OWN),
                &request.requester.id,
                &request.cancel,
            )
            .await
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Playlist search; returns the context so the expansion runs under it too
    pub async fn catalog_playlists(
        &self,
        request: &ResolveRequest,
    ) -> Result<(Vec<PlaylistSummary>, CredentialContext)> {
        let limit = self.limit_for(request, Source::CatalogList)?;
        let ctx = self.context(request).await?;
        let query = request.input.text();

        let found = if request.input.is_set(flags::OWN) {
            self.catalog.search_own_playlist(&ctx, query, limit).await?
        } else {
            self.catalog.search_playlist(&ctx, query, limit).await?
        };

        debug!(query = %query, limit, candidates = found.len(), "Catalog playlist search");
        Ok((found, ctx))
    }

    pub async fn catalog_tracks(&self, request: &ResolveRequest) -> Result<Vec<Track>> {
        let limit = self.limit_for(request, Source::CatalogTrack)?;
        let ctx = self.context(request).await?;
        let query = request.input.text();
        let own = request.input.is_set(flags::OWN);

        let found = self.catalog.search_track(&ctx, query, own, limit).await?;
        debug!(query = %query, own, limit, candidates = found.len(), "Catalog track search");
        Ok(found)
    }

    pub async fn catalog_albums(&self, request: &ResolveRequest) -> Result<Vec<AlbumSummary>> {
        let limit = self.limit_for(request, Source::CatalogAlbum)?;
        let ctx = self.context(request).await?;
        let query = request.input.text();
        let own = request.input.is_set(flags::OWN);

        let found = self.catalog.search_album(&ctx, query, own, limit).await?;
        debug!(query = %query, own, limit, candidates = found.len(), "Catalog album search");
        Ok(found)
    }

    pub async fn catalog_episodes(&self, request: &ResolveRequest) -> Result<Vec<Episode>> {
        let limit = self.limit_for(request, Source::CatalogEpisode)?;
        let ctx = self.context(request).await?;
        let query = request.input.text();
        let own = request.input.is_set(flags::OWN);

        let found = self.catalog.search_episode(&ctx, query, own, limit).await?;
        debug!(query = %query, own, limit, candidates = found.len(), "Catalog episode search");
        Ok(found)
    }

    pub async fn catalog_shows(&self, request: &ResolveRequest) -> Result<Vec<ShowSummary>> {
        let limit = self.limit_for(request, Source::CatalogShow)?;
        let ctx = self.context(request).await?;
        let query = request.input.text();
        let own = request.input.is_set(flags::OWN);

        let found = self.catalog.search_show(&ctx, query, own, limit).await?;
        debug!(query = %query, own, limit, candidates = found.len(), "Catalog show search");
        Ok(found)
    }

    pub async fn playlist_items(
        &self,
        ctx: &CredentialContext,
        playlist: &PlaylistSummary,
    ) -> Result<Vec<CatalogItem>> {
        self.catalog.get_playlist_tracks(ctx, &playlist.id).await
    }

    /// Album expansion always runs on the shared credentials
    pub async fn album_tracks(&self, album: &AlbumSummary) -> Result<Vec<Track>> {
        self.catalog
            .get_album_tracks(&self.credentials.shared(), &album.id)
            .await
    }

    /// Show expansion always runs on the shared credentials
    pub async fn show_episodes(&self, show: &ShowSummary) -> Result<Vec<Episode>> {
        self.catalog
            .get_show_episodes(&self.credentials.shared(), &show.id)
            .await
    }

    // ========================================================================
    // Video
    // ========================================================================

    /// With `select`, up to the limit; otherwise the single best playlist
    pub async fn video_playlists(&self, request: &ResolveRequest) -> Result<Vec<VideoPlaylist>> {
        let query = request.input.text();

        if request.input.is_set(flags::SELECT) {
            let limit = self.limit_for(request, Source::VideoList)?;
            let found = self.video.search_several_playlists(limit, query).await?;
            debug!(query = %query, limit, candidates = found.len(), "Video playlist search");
            Ok(found)
        } else {
            let found = self.video.search_playlist(query).await?;
            debug!(query = %query, found = found.is_some(), "Video playlist lookup");
            Ok(found.into_iter().collect())
        }
    }

    /// With `select`, up to the limit; otherwise the single best video
    pub async fn videos(&self, request: &ResolveRequest) -> Result<Vec<Video>> {
        let query = request.input.text();

        if request.input.is_set(flags::SELECT) {
            let limit = self.limit_for(request, Source::VideoSingle)?;
            let found = self.video.search_several_videos(limit, query).await?;
            debug!(query = %query, limit, candidates = found.len(), "Video search");
            Ok(found)
        } else {
            let found = self.video.search_video(query).await?;
            debug!(query = %query, found = found.is_some(), "Video lookup");
            Ok(found.into_iter().collect())
        }
    }

    pub async fn video_playlist_videos(&self, playlist: &VideoPlaylist) -> Result<Vec<Video>> {
        self.video.playlist_videos(&playlist.id).await
    }

    // ========================================================================
    // Peer audio
    // ========================================================================

    /// Look up the peer-audio search identifier for the request text
    pub async fn peer_audio(&self, request: &ResolveRequest) -> Result<Option<AudioItem>> {
        let identifier = format!(
            "{}{}",
            self.config.peer_audio_search_prefix,
            request.input.text()
        );
        let item = self.peer_audio.load_item(&identifier).await?;
        debug!(identifier = %identifier, found = item.is_some(), "Peer audio lookup");
        Ok(item)
    }

    pub fn peer_audio_limit(&self, request: &ResolveRequest) -> Result<usize> {
        self.limit_for(request, Source::PeerAudio)
    }

    // ========================================================================
    // Local playlists and URLs
    // ========================================================================

    /// Keyed read, at most one match
    pub async fn local_playlist(&self, request: &ResolveRequest) -> Result<Option<LocalPlaylist>> {
        let name = request.input.text();
        let found = self
            .local
            .find_playlist(&request.requester.scope, name)
            .await?;
        debug!(name = %name, scope = %request.requester.scope, found = found.is_some(), "Local playlist lookup");
        Ok(found)
    }

    pub async fn local_items(&self, playlist: &LocalPlaylist) -> Result<Vec<PlaylistItem>> {
        self.local
            .playlist_items(playlist, &self.credentials.shared())
            .await
    }

    pub async fn url_items(&self, request: &ResolveRequest) -> Result<Vec<PlaylistItem>> {
        let items = self
            .urls
            .load_url(request.input.text(), &self.credentials.shared())
            .await?;
        debug!(url = %request.input.text(), items = items.len(), "Loaded URL");
        Ok(items)
    }
}
