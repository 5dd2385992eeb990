//! Playable resolver
//!
//! Entry point of a resolution. A request is classified into exactly one
//! source, the dispatcher runs the bounded lookup, the disambiguation gate
//! narrows several candidates down to one, and the factory turns the
//! chosen entity into an ordered, non-empty playable sequence.

use crate::classifier::classify;
use crate::config::ResolverConfig;
use crate::credentials::CredentialSelector;
use crate::dispatch::{best_track_match, cardinality, Cardinality, Dispatcher};
use crate::factory::PlayableFactory;
use crate::gate::{DisambiguationGate, Disambiguator, Labeler};
use crate::sink::ResultSink;
use chorus_core::types::{
    flags, AlbumSummary, AudioItem, AudioTrack, CommandInput, Episode, LoadedEntity,
    PlaylistSummary, Requester, ShowSummary, Source, Track, UriKind, Video, VideoPlaylist,
};
use chorus_core::{
    CatalogProvider, InputSyntax, LocalPlaylistStore, LoginProvider, Outcome, PeerAudioProvider,
    Playable, ResolveError, Resolution, Result, TrackLoadingExecutor, UrlLoader, VideoProvider,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A single resolution request
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub input: CommandInput,
    pub requester: Requester,
    /// Turn catalog items into deferred streams instead of catalog identities
    pub redirect: bool,
    pub cancel: CancellationToken,
}

impl ResolveRequest {
    pub fn new(input: CommandInput, requester: Requester) -> Self {
        Self {
            input,
            requester,
            redirect: false,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_redirect(mut self, redirect: bool) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Everything the resolver talks to
#[derive(Clone)]
pub struct Collaborators {
    pub syntax: Arc<dyn InputSyntax>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub video: Arc<dyn VideoProvider>,
    pub peer_audio: Arc<dyn PeerAudioProvider>,
    pub local: Arc<dyn LocalPlaylistStore>,
    pub urls: Arc<dyn UrlLoader>,
    pub logins: Arc<dyn LoginProvider>,
    pub executor: Arc<dyn TrackLoadingExecutor>,
    pub disambiguator: Arc<dyn Disambiguator>,
}

/// Resolves free-form requests into playables
pub struct PlayableResolver {
    config: Arc<ResolverConfig>,
    syntax: Arc<dyn InputSyntax>,
    dispatcher: Dispatcher,
    gate: DisambiguationGate,
    factory: PlayableFactory,
}

impl PlayableResolver {
    pub fn new(config: ResolverConfig, collaborators: Collaborators) -> Self {
        let config = Arc::new(config);
        let credentials =
            CredentialSelector::new(collaborators.logins, config.login_timeout());
        let dispatcher = Dispatcher::new(
            collaborators.catalog,
            collaborators.video,
            collaborators.peer_audio,
            collaborators.local,
            collaborators.urls,
            credentials,
            Arc::clone(&config),
        );
        let factory =
            PlayableFactory::new(collaborators.executor, config.catalog_uri_scheme.clone());

        Self {
            syntax: collaborators.syntax,
            gate: DisambiguationGate::new(collaborators.disambiguator),
            dispatcher,
            factory,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolution path the input would take
    pub fn classify(&self, input: &CommandInput) -> Source {
        classify(input, self.syntax.as_ref(), self.config.default_provider)
    }

    /// Resolve a request
    ///
    /// A cancelled question or login wait is `Ok(Outcome::Cancelled)`.
    ///
    /// # Errors
    /// `NotFound` when nothing matched, `AuthenticationRequired` when the
    /// requester must log in first, `InvalidInput` for malformed input, and
    /// any provider failure unchanged.
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<Outcome> {
        let source = self.classify(&request.input);
        info!(
            requester = %request.requester.id,
            source = ?source,
            query = %request.input.text(),
            redirect = request.redirect,
            "Resolving request"
        );

        match self.resolve_source(source, request).await {
            Ok(resolution) => {
                info!(
                    entity = resolution.entity().kind(),
                    name = %resolution.entity().name(),
                    playables = resolution.loaded_amount(),
                    "Resolved request"
                );
                Ok(Outcome::Delivered(resolution))
            }
            Err(ResolveError::Cancelled) => {
                info!(requester = %request.requester.id, "Resolution cancelled");
                Ok(Outcome::Cancelled)
            }
            Err(e) => {
                warn!(source = ?source, error = %e, "Resolution failed");
                Err(e)
            }
        }
    }

    /// Resolve a request and hand a successful result to `sink`
    ///
    /// The sink is called at most once, and only on success. Returns
    /// whether it was called.
    pub async fn resolve_into<S>(&self, request: &ResolveRequest, sink: &mut S) -> Result<bool>
    where
        S: ResultSink + ?Sized,
    {
        match self.resolve(request).await? {
            Outcome::Delivered(resolution) => {
                sink.deliver(resolution);
                Ok(true)
            }
            Outcome::Cancelled => Ok(false),
        }
    }

    async fn resolve_source(&self, source: Source, request: &ResolveRequest) -> Result<Resolution> {
        match source {
            Source::DirectUrl => self.direct_url(request).await,
            Source::ProviderUri => self.provider_uri(request).await,
            Source::CatalogList => self.catalog_list(request).await,
            Source::CatalogTrack => self.catalog_track(request).await,
            Source::CatalogAlbum => self.catalog_album(request).await,
            Source::CatalogEpisode => self.catalog_episode(request).await,
            Source::CatalogShow => self.catalog_show(request).await,
            Source::VideoList => self.video_list(request).await,
            Source::VideoSingle => self.video_single(request).await,
            Source::PeerAudio => self.peer_audio(request).await,
            Source::LocalList => self.local_list(request).await,
        }
    }

    /// One candidate goes through, several go to the gate
    async fn choose<T: Send>(
        &self,
        found: Vec<T>,
        labels: &Labeler<T>,
        not_found: impl FnOnce() -> ResolveError,
        cancel: &CancellationToken,
    ) -> Result<T> {
        match cardinality(found, not_found)? {
            Cardinality::One(candidate) => Ok(candidate),
            Cardinality::Many(candidates) => self.gate.ask(candidates, labels, cancel).await,
        }
    }

    // ========================================================================
    // Explicit identifiers
    // ========================================================================

    async fn direct_url(&self, request: &ResolveRequest) -> Result<Resolution> {
        let url = request.input.text();
        let items = self.dispatcher.url_items(request).await?;
        let playables = self.factory.items(items, request.redirect);

        deliver(playables, LoadedEntity::Url(url.to_string()), || {
            missing(Source::DirectUrl, format!("Nothing playable found at '{}'", url))
        })
    }

    async fn provider_uri(&self, request: &ResolveRequest) -> Result<Resolution> {
        let descriptor = self.syntax.parse_provider_uri(request.input.text())?;
        let catalog = self.dispatcher.catalog();
        let ctx = self
            .dispatcher
            .credentials()
            .select(
                request.input.is_set(flags::OWN),
                &request.requester.id,
                &request.cancel,
            )
            .await?;
        let id = descriptor.id.as_str();
        let not_found = || {
            missing(Source::ProviderUri, format!("No catalog {} with id '{}'", descriptor.kind, id))
        };

        debug!(kind = %descriptor.kind, id = %id, "Loading provider URI");

        match descriptor.kind {
            UriKind::Track => {
                let track = catalog.get_track(&ctx, id).await?.ok_or_else(not_found)?;
                let playables = self.factory.tracks(vec![track.clone()], request.redirect);
                deliver(playables, LoadedEntity::CatalogTrack(track), not_found)
            }
            UriKind::Episode => {
                let episode = catalog.get_episode(&ctx, id).await?.ok_or_else(not_found)?;
                let playables = self.factory.episodes(vec![episode.clone()], request.redirect);
                deliver(playables, LoadedEntity::CatalogEpisode(episode), not_found)
            }
            UriKind::Album => {
                let album = catalog.get_album(&ctx, id).await?.ok_or_else(not_found)?;
                let tracks = self.dispatcher.album_tracks(&album).await?;
                let playables = self.factory.tracks(tracks, request.redirect);
                deliver(playables, LoadedEntity::CatalogAlbum(album), || {
                    missing(Source::ProviderUri, "Album is empty")
                })
            }
            UriKind::Playlist => {
                let playlist = catalog.get_playlist(&ctx, id).await?.ok_or_else(not_found)?;
                let items = self.dispatcher.playlist_items(&ctx, &playlist).await?;
                let playables = self.factory.catalog_items(items, request.redirect);
                deliver(playables, LoadedEntity::CatalogPlaylist(playlist), || {
                    missing(Source::ProviderUri, "Playlist is empty")
                })
            }
            UriKind::Show => {
                let show = catalog.get_show(&ctx, id).await?.ok_or_else(not_found)?;
                let episodes = self.dispatcher.show_episodes(&show).await?;
                let playables = self.factory.episodes(episodes, request.redirect);
                deliver(playables, LoadedEntity::CatalogShow(show), || {
                    missing(Source::ProviderUri, "Show has no episodes")
                })
            }
        }
    }

    // ========================================================================
    // Catalog searches
    // ========================================================================

    async fn catalog_list(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let (found, ctx) = self.dispatcher.catalog_playlists(request).await?;
        let labels = Labeler::new(|p: &PlaylistSummary| p.name.clone())
            .with_secondary(|p: &PlaylistSummary| Some(format!("by {}, {} tracks", p.owner, p.track_count)));

        let playlist = self
            .choose(
                found,
                &labels,
                || missing(Source::CatalogList, format!("No catalog playlist found for '{}'", query)),
                &request.cancel,
            )
            .await?;

        let items = self.dispatcher.playlist_items(&ctx, &playlist).await?;
        let playables = self.factory.catalog_items(items, request.redirect);
        deliver(playables, LoadedEntity::CatalogPlaylist(playlist), || {
            missing(Source::CatalogList, "Playlist is empty")
        })
    }

    async fn catalog_track(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let found = self.dispatcher.catalog_tracks(request).await?;
        let not_found =
            || missing(Source::CatalogTrack, format!("No catalog track found for '{}'", query));

        let auto_pick = self.config.auto_pick_best_track && !request.input.is_set(flags::SELECT);
        let track = if auto_pick && found.len() > 1 {
            let best = best_track_match(query, found).ok_or_else(not_found)?;
            debug!(track = %best.display(), "Picked best track match");
            best
        } else {
            let labels = Labeler::new(|t: &Track| t.display())
                .with_secondary(|t: &Track| t.album.as_ref().map(|a| a.name.clone()));
            self.choose(found, &labels, not_found, &request.cancel).await?
        };

        let playables = self.factory.tracks(vec![track.clone()], request.redirect);
        deliver(playables, LoadedEntity::CatalogTrack(track), not_found)
    }

    async fn catalog_album(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let found = self.dispatcher.catalog_albums(request).await?;
        let labels = Labeler::new(|a: &AlbumSummary| a.name.clone())
            .with_secondary(|a: &AlbumSummary| Some(a.artist_names()));

        let album = self
            .choose(
                found,
                &labels,
                || missing(Source::CatalogAlbum, format!("No catalog album found for '{}'", query)),
                &request.cancel,
            )
            .await?;

        let tracks = self.dispatcher.album_tracks(&album).await?;
        let playables = self.factory.tracks(tracks, request.redirect);
        deliver(playables, LoadedEntity::CatalogAlbum(album), || {
            missing(Source::CatalogAlbum, "Album is empty")
        })
    }

    async fn catalog_episode(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let found = self.dispatcher.catalog_episodes(request).await?;
        let labels = Labeler::new(|e: &Episode| e.display());
        let not_found =
            || missing(Source::CatalogEpisode, format!("No catalog episode found for '{}'", query));

        let episode = self.choose(found, &labels, not_found, &request.cancel).await?;
        let playables = self.factory.episodes(vec![episode.clone()], request.redirect);
        deliver(playables, LoadedEntity::CatalogEpisode(episode), not_found)
    }

    async fn catalog_show(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let found = self.dispatcher.catalog_shows(request).await?;
        let labels = Labeler::new(|s: &ShowSummary| s.name.clone())
            .with_secondary(|s: &ShowSummary| Some(s.publisher.clone()));

        let show = self
            .choose(
                found,
                &labels,
                || missing(Source::CatalogShow, format!("No catalog show found for '{}'", query)),
                &request.cancel,
            )
            .await?;

        let episodes = self.dispatcher.show_episodes(&show).await?;
        let playables = self.factory.episodes(episodes, request.redirect);
        deliver(playables, LoadedEntity::CatalogShow(show), || {
            missing(Source::CatalogShow, "Show has no episodes")
        })
    }

    // ========================================================================
    // Video searches
    // ========================================================================

    async fn video_list(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let found = self.dispatcher.video_playlists(request).await?;
        let labels = Labeler::new(|p: &VideoPlaylist| p.title.clone())
            .with_secondary(|p: &VideoPlaylist| Some(p.channel_title.clone()));

        let playlist = self
            .choose(
                found,
                &labels,
                || missing(Source::VideoList, format!("No video playlist found for '{}'", query)),
                &request.cancel,
            )
            .await?;

        let videos = self.dispatcher.video_playlist_videos(&playlist).await?;
        let playables = self.factory.videos(videos);
        deliver(playables, LoadedEntity::VideoPlaylist(playlist), || {
            missing(Source::VideoList, "Video playlist is empty")
        })
    }

    async fn video_single(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let found = self.dispatcher.videos(request).await?;
        let labels = Labeler::new(|v: &Video| v.title.clone())
            .with_secondary(|v: &Video| Some(v.channel_title.clone()));
        let not_found = || missing(Source::VideoSingle, format!("No video found for '{}'", query));

        let video = self.choose(found, &labels, not_found, &request.cancel).await?;
        let playables = vec![self.factory.video(video.clone())];
        deliver(playables, LoadedEntity::Video(video), not_found)
    }

    // ========================================================================
    // Peer audio and local playlists
    // ========================================================================

    async fn peer_audio(&self, request: &ResolveRequest) -> Result<Resolution> {
        let query = request.input.text();
        let limit = self.dispatcher.peer_audio_limit(request)?;
        let not_found = || missing(Source::PeerAudio, format!("No audio found for '{}'", query));

        let item = self.dispatcher.peer_audio(request).await?.ok_or_else(not_found)?;

        match item {
            AudioItem::Track(track) => {
                let playables = vec![self.factory.audio_track(track.clone())];
                deliver(playables, LoadedEntity::PeerAudioTrack(track), not_found)
            }
            AudioItem::Collection(collection) => {
                let mut hits = collection.tracks;
                hits.truncate(limit);
                debug!(collection = %collection.name, candidates = hits.len(), "Peer audio collection");
                let labels = Labeler::new(|t: &AudioTrack| t.title.clone())
                    .with_secondary(|t: &AudioTrack| Some(t.author.clone()));

                let track = self.choose(hits, &labels, not_found, &request.cancel).await?;
                let playables = vec![self.factory.audio_track(track.clone())];
                deliver(playables, LoadedEntity::PeerAudioTrack(track), not_found)
            }
        }
    }

    async fn local_list(&self, request: &ResolveRequest) -> Result<Resolution> {
        let name = request.input.text();
        let playlist = self
            .dispatcher
            .local_playlist(request)
            .await?
            .ok_or_else(|| missing(Source::LocalList, format!("No local playlist found for '{}'", name)))?;

        let items = self.dispatcher.local_items(&playlist).await?;
        let playables = self.factory.items(items, request.redirect);
        deliver(playables, LoadedEntity::LocalPlaylist(playlist), || {
            missing(Source::LocalList, "Playlist is empty")
        })
    }
}

/// Not-found error of the kind `source` reports
fn missing(source: Source, message: impl Into<String>) -> ResolveError {
    if source.is_catalog() {
        ResolveError::catalog_not_found(message)
    } else {
        ResolveError::not_found(message)
    }
}

/// Pair playables with their entity, or fail when there are none
fn deliver(
    playables: Vec<Playable>,
    entity: LoadedEntity,
    empty: impl FnOnce() -> ResolveError,
) -> Result<Resolution> {
    Resolution::new(playables, entity).ok_or_else(empty)
}
