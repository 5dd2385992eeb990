//! End-to-end resolution tests against the in-memory providers

mod test_helpers;

use chorus_core::types::{
    flags, CommandInput, PlayableAudio, PlaybackTarget, ProviderHint, Requester, RequesterId,
};
use chorus_core::{LoadedEntity, NotFoundKind, Outcome, ResolveError, Resolution};
use chorus_resolver::memory::CallCredentials;
use chorus_resolver::{ResolveRequest, ResolverConfig};
use serde_json::json;
use test_helpers::*;

fn delivered(outcome: Outcome) -> Resolution {
    match outcome {
        Outcome::Delivered(resolution) => resolution,
        Outcome::Cancelled => panic!("expected a delivered resolution"),
    }
}

fn ids(resolution: &Resolution) -> Vec<&str> {
    resolution.playables().iter().map(|p| p.id()).collect()
}

fn assert_not_found(err: &ResolveError, kind: NotFoundKind) {
    assert_eq!(err.not_found_kind(), Some(kind), "unexpected error: {}", err);
}

// ===== Local playlists =====

#[tokio::test]
async fn missing_local_playlist_is_generic_not_found() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("Chill").flag(flags::LIST).flag(flags::LOCAL);

    let err = h.resolver.resolve(&request(input)).await.unwrap_err();

    // "Chill" exists, but in another scope
    assert_not_found(&err, NotFoundKind::Generic);
    assert_eq!(err.to_string(), "No local playlist found for 'Chill'");
}

#[tokio::test]
async fn local_playlist_keeps_stored_order() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("party").flag(flags::LIST).flag(flags::LOCAL);

    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());

    assert_eq!(ids(&resolution), vec!["vid-cat-1", "imagine"]);
    assert!(matches!(resolution.entity(), LoadedEntity::LocalPlaylist(p) if p.id == "l1"));
}

#[tokio::test]
async fn empty_local_playlist_is_generic_not_found() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("Empty").flag(flags::LIST).flag(flags::LOCAL);

    let err = h.resolver.resolve(&request(input)).await.unwrap_err();
    assert_not_found(&err, NotFoundKind::Generic);
}

// ===== Catalog tracks =====

#[tokio::test]
async fn single_track_needs_no_question() {
    let mut h = harness(&sample_fixture());

    let resolution = delivered(
        h.resolver
            .resolve(&request(CommandInput::new("Imagine")))
            .await
            .unwrap(),
    );

    assert_eq!(resolution.loaded_amount(), 1);
    assert!(matches!(resolution.entity(), LoadedEntity::CatalogTrack(t) if t.id == "imagine"));
    assert!(matches!(
        resolution.playables()[0].audio(),
        PlayableAudio::Catalog { uri } if uri == "spotify:track:imagine"
    ));
    assert!(h.questions.try_recv().is_err());

    let calls = h.providers.calls().await;
    assert_eq!(calls[0].method, "search_track");
    assert_eq!(calls[0].limit, Some(20));
    assert_eq!(calls[0].credentials, CallCredentials::Shared);
}

#[tokio::test]
async fn unknown_track_is_catalog_not_found() {
    let h = harness(&sample_fixture());
    let err = h
        .resolver
        .resolve(&request(CommandInput::new("Nonexistent Song")))
        .await
        .unwrap_err();
    assert_not_found(&err, NotFoundKind::CatalogSpecific);
}

#[tokio::test]
async fn several_tracks_ask_with_artist_and_album_labels() {
    let mut h = harness(&sample_fixture());
    let req = request(CommandInput::new("Hit"));

    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        let question = pending.question().clone();
        pending.choose("3").expect("valid key");
        question
    };

    let (outcome, question) = tokio::join!(h.resolver.resolve(&req), answer);
    let resolution = delivered(outcome.unwrap());

    assert_eq!(question.len(), 4);
    assert_eq!(question.options()[2].primary, "Hit C by Artist C");
    assert_eq!(question.options()[2].secondary.as_deref(), Some("Abbey Road"));
    // no album, no secondary label
    assert_eq!(question.options()[0].primary, "Hit A by Artist A");
    assert_eq!(question.options()[0].secondary, None);
    assert_eq!(ids(&resolution), vec!["hit-c"]);
}

#[tokio::test]
async fn auto_pick_skips_the_question() {
    let config = ResolverConfig {
        auto_pick_best_track: true,
        ..ResolverConfig::default()
    };
    let fixture = json!({ "tracks": [
        track("live", "Imagine (Live)", "John Lennon"),
        track("studio", "Imagine", "John Lennon")
    ]});
    let mut h = harness_with(&fixture, config);

    let resolution = delivered(
        h.resolver
            .resolve(&request(CommandInput::new("imagine")))
            .await
            .unwrap(),
    );

    assert_eq!(ids(&resolution), vec!["studio"]);
    assert!(h.questions.try_recv().is_err());
}

#[tokio::test]
async fn select_overrides_auto_pick() {
    let config = ResolverConfig {
        auto_pick_best_track: true,
        ..ResolverConfig::default()
    };
    let fixture = json!({ "tracks": [
        track("live", "Imagine (Live)", "John Lennon"),
        track("studio", "Imagine", "John Lennon")
    ]});
    let mut h = harness_with(&fixture, config);
    let req = request(CommandInput::new("imagine").flag(flags::SELECT));

    let questions = &mut h.questions;
    let answer = async {
        questions.recv().await.expect("question asked").choose("1").expect("valid key");
    };

    let (outcome, ()) = tokio::join!(h.resolver.resolve(&req), answer);
    assert_eq!(ids(&delivered(outcome.unwrap())), vec!["live"]);
}

#[tokio::test]
async fn own_flag_searches_saved_tracks_with_login() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("Song").flag(flags::OWN);

    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());
    assert_eq!(ids(&resolution), vec!["saved-1"]);

    let calls = h.providers.calls().await;
    assert_eq!(calls[0].method, "await_login");
    assert_eq!(
        calls[1].credentials,
        CallCredentials::Requester(RequesterId::new("u1"))
    );
}

#[tokio::test]
async fn own_flag_without_login_requires_authentication() {
    let h = harness(&sample_fixture());
    let req = ResolveRequest::new(
        CommandInput::new("Song").flag(flags::OWN),
        Requester::new("stranger", "guild-1"),
    );

    let err = h.resolver.resolve(&req).await.unwrap_err();
    assert!(matches!(err, ResolveError::AuthenticationRequired(_)));

    // no search went out
    let calls = h.providers.calls().await;
    assert!(calls.iter().all(|c| c.method == "await_login"));
}

// ===== Catalog playlists, albums, shows =====

#[tokio::test]
async fn chosen_playlist_delivers_its_tracks_in_order() {
    let mut h = harness(&sample_fixture());
    let req = request(CommandInput::new("Top Hits").flag(flags::LIST));

    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        assert_eq!(pending.question().len(), 3);
        pending.choose("2").expect("valid key");
    };

    let (outcome, ()) = tokio::join!(h.resolver.resolve(&req), answer);
    let resolution = delivered(outcome.unwrap());

    assert_eq!(ids(&resolution), vec!["hit-c", "hit-a", "hit-d"]);
    assert!(matches!(resolution.entity(), LoadedEntity::CatalogPlaylist(p) if p.id == "p2"));
}

#[tokio::test]
async fn own_playlist_expansion_reuses_requester_context() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("road").flag(flags::LIST).flag(flags::OWN);

    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());
    assert_eq!(ids(&resolution), vec!["hit-b", "hit-a"]);

    let calls = h.providers.calls().await;
    let expansion = calls
        .iter()
        .find(|c| c.method == "get_playlist_tracks")
        .expect("playlist expanded");
    assert_eq!(
        expansion.credentials,
        CallCredentials::Requester(RequesterId::new("u1"))
    );
    assert!(calls.iter().any(|c| c.method == "search_own_playlist"));
}

#[tokio::test]
async fn album_expands_on_shared_credentials() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("Abbey").flag(flags::ALBUM).flag(flags::OWN);

    // nothing saved matches "Abbey"
    let err = h.resolver.resolve(&request(input)).await.unwrap_err();
    assert_not_found(&err, NotFoundKind::CatalogSpecific);

    let input = CommandInput::new("Abbey").flag(flags::ALBUM);
    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());
    assert_eq!(ids(&resolution), vec!["hit-c", "hit-a", "hit-b"]);

    let calls = h.providers.calls().await;
    let expansion = calls
        .iter()
        .find(|c| c.method == "get_album_tracks")
        .expect("album expanded");
    assert_eq!(expansion.credentials, CallCredentials::Shared);
}

#[tokio::test]
async fn empty_album_is_catalog_not_found() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("Silence").flag(flags::ALBUM);

    let err = h.resolver.resolve(&request(input)).await.unwrap_err();
    assert_not_found(&err, NotFoundKind::CatalogSpecific);
}

#[tokio::test]
async fn podcast_delivers_all_episodes_of_the_show() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("tech").flag(flags::PODCAST);

    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());
    assert_eq!(ids(&resolution), vec!["ep2", "ep1"]);
    assert!(matches!(resolution.entity(), LoadedEntity::CatalogShow(s) if s.id == "show1"));
}

#[tokio::test]
async fn episode_flag_wins_over_podcast() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("deep")
        .flag(flags::EPISODE)
        .flag(flags::PODCAST);

    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());
    assert!(matches!(resolution.entity(), LoadedEntity::CatalogEpisode(e) if e.id == "ep1"));
    assert!(matches!(
        resolution.playables()[0].audio(),
        PlayableAudio::Catalog { uri } if uri == "spotify:episode:ep1"
    ));
}

// ===== Provider URIs and URLs =====

#[tokio::test]
async fn album_uri_loads_album_directly() {
    let mut h = harness(&sample_fixture());

    let resolution = delivered(
        h.resolver
            .resolve(&request(CommandInput::new("spotify:album:abbey").flag(flags::LIST)))
            .await
            .unwrap(),
    );

    assert_eq!(ids(&resolution), vec!["hit-c", "hit-a", "hit-b"]);
    assert!(matches!(resolution.entity(), LoadedEntity::CatalogAlbum(a) if a.id == "abbey"));
    assert!(h.questions.try_recv().is_err());

    let calls = h.providers.calls().await;
    assert!(calls.iter().all(|c| !c.method.starts_with("search")));
}

#[tokio::test]
async fn unknown_uri_is_catalog_not_found() {
    let h = harness(&sample_fixture());
    let err = h
        .resolver
        .resolve(&request(CommandInput::new("spotify:track:doesnotexist")))
        .await
        .unwrap_err();
    assert_not_found(&err, NotFoundKind::CatalogSpecific);
}

#[tokio::test]
async fn url_items_are_delivered_as_url_entity() {
    let h = harness(&sample_fixture());
    let url = "https://music.example.com/set/42";

    let resolution = delivered(
        h.resolver
            .resolve(&request(CommandInput::new(url).flag(flags::LIST)))
            .await
            .unwrap(),
    );

    assert_eq!(ids(&resolution), vec!["u-1"]);
    assert_eq!(resolution.entity(), &LoadedEntity::Url(url.to_string()));
}

#[tokio::test]
async fn url_with_nothing_behind_it_is_generic_not_found() {
    let h = harness(&sample_fixture());
    let err = h
        .resolver
        .resolve(&request(CommandInput::new("https://nowhere.example.com/x")))
        .await
        .unwrap_err();
    assert_not_found(&err, NotFoundKind::Generic);
}

// ===== Video =====

#[tokio::test]
async fn video_without_select_is_a_single_search() {
    let mut h = harness(&sample_fixture());
    let input = CommandInput::new("funny cat").flag(flags::YOUTUBE);

    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());

    assert_eq!(ids(&resolution), vec!["vid-cat-1"]);
    assert!(h.questions.try_recv().is_err());
    let calls = h.providers.calls().await;
    assert_eq!(calls[0].method, "search_video");
}

#[tokio::test]
async fn video_select_asks_among_limited_results() {
    let mut h = harness(&sample_fixture());
    let req = request(
        CommandInput::new("funny cat")
            .flag(flags::YOUTUBE)
            .flag_value(flags::SELECT, "2"),
    );

    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        assert_eq!(pending.question().len(), 2);
        pending.choose("2").expect("valid key");
    };

    let (outcome, ()) = tokio::join!(h.resolver.resolve(&req), answer);
    let resolution = delivered(outcome.unwrap());

    assert_eq!(ids(&resolution), vec!["vid-cat-2"]);
    let calls = h.providers.calls().await;
    assert_eq!(calls[0].method, "search_several_videos");
    assert_eq!(calls[0].limit, Some(2));
}

#[tokio::test]
async fn video_playlist_expands_in_order() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("cat videos")
        .flag(flags::LIST)
        .flag(flags::YOUTUBE);

    let resolution = delivered(h.resolver.resolve(&request(input)).await.unwrap());
    assert_eq!(ids(&resolution), vec!["vid-cat-2", "vid-cat-1"]);
    assert!(matches!(resolution.entity(), LoadedEntity::VideoPlaylist(p) if p.id == "vpl1"));
}

#[tokio::test]
async fn missing_video_is_generic_not_found() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("no such clip").flag(flags::YOUTUBE);

    let err = h.resolver.resolve(&request(input)).await.unwrap_err();
    assert_not_found(&err, NotFoundKind::Generic);
}

#[tokio::test]
async fn zero_select_is_invalid_input() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("funny cat")
        .flag(flags::YOUTUBE)
        .flag_value(flags::SELECT, "0");

    let err = h.resolver.resolve(&request(input)).await.unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(_)));
}

// ===== Peer audio =====

#[tokio::test]
async fn peer_search_offers_at_most_the_limit() {
    let mut h = harness(&peer_search_fixture("lofi", 25));
    let req = request(CommandInput::new("lofi").flag(flags::SOUNDCLOUD));

    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        assert_eq!(pending.question().len(), 20);
        pending.choose("20").expect("valid key");
    };

    let (outcome, ()) = tokio::join!(h.resolver.resolve(&req), answer);
    let resolution = delivered(outcome.unwrap());

    assert_eq!(ids(&resolution), vec!["lofi-20"]);
    assert!(matches!(resolution.entity(), LoadedEntity::PeerAudioTrack(_)));

    let calls = h.providers.calls().await;
    assert_eq!(calls[0].argument, "scsearch:lofi");
}

#[tokio::test]
async fn peer_single_track_and_small_collection() {
    let mut h = harness(&sample_fixture());

    let rain = delivered(
        h.resolver
            .resolve(&request(CommandInput::new("rain").flag(flags::SOUNDCLOUD)))
            .await
            .unwrap(),
    );
    assert!(matches!(rain.entity(), LoadedEntity::PeerAudioTrack(t) if t.identifier == "rain-1"));

    let req = request(CommandInput::new("mixtape").flag(flags::SOUNDCLOUD));
    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        let offered = pending.question().len();
        pending.choose("2").expect("valid key");
        offered
    };

    let (outcome, offered) = tokio::join!(h.resolver.resolve(&req), answer);
    let mixtape = delivered(outcome.unwrap());

    assert_eq!(offered, 2);
    assert_eq!(ids(&mixtape), vec!["m2"]);
    assert!(matches!(mixtape.entity(), LoadedEntity::PeerAudioTrack(t) if t.identifier == "m2"));
}

#[tokio::test]
async fn any_peer_collection_is_limited_and_asked() {
    let fixture = json!({
        "peer_audio": {
            "scsearch:lofi": {
                "type": "collection",
                "name": "lofi",
                "tracks": (1..=25).map(|i| audio(&format!("lofi-{}", i), "lofi")).collect::<Vec<_>>()
            }
        }
    });
    let mut h = harness(&fixture);
    let req = request(
        CommandInput::new("lofi")
            .flag(flags::SOUNDCLOUD)
            .flag_value(flags::SELECT, "20"),
    );
    let mut received = Vec::new();
    let mut sink = |resolution: Resolution| received.push(resolution);

    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        let offered = pending.question().len();
        pending.choose("20").expect("valid key");
        offered
    };

    let (result, offered) = tokio::join!(h.resolver.resolve_into(&req, &mut sink), answer);
    assert!(result.unwrap());
    assert_eq!(offered, 20);
    assert_eq!(received.len(), 1);
    assert_eq!(ids(&received[0]), vec!["lofi-20"]);
}

#[tokio::test]
async fn several_episodes_ask_with_a_single_label() {
    let fixture = json!({
        "episodes": [
            { "id": "e1", "name": "Part One", "show": { "id": "s", "name": "Saga" }, "duration_ms": 1000 },
            { "id": "e2", "name": "Part Two", "show": { "id": "s", "name": "Saga" }, "duration_ms": 1000 }
        ]
    });
    let mut h = harness(&fixture);
    let req = request(CommandInput::new("part").flag(flags::EPISODE));

    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        let question = pending.question().clone();
        pending.choose("1").expect("valid key");
        question
    };

    let (outcome, question) = tokio::join!(h.resolver.resolve(&req), answer);
    delivered(outcome.unwrap());

    assert_eq!(question.options()[1].primary, "Part Two by Saga");
    assert!(question.options().iter().all(|o| o.secondary.is_none()));
}

#[tokio::test]
async fn missing_peer_audio_is_generic_not_found() {
    let h = harness(&sample_fixture());
    let err = h
        .resolver
        .resolve(&request(CommandInput::new("silence").flag(flags::SOUNDCLOUD)))
        .await
        .unwrap_err();
    assert_not_found(&err, NotFoundKind::Generic);
}

// ===== Cancellation and delivery =====

#[tokio::test]
async fn declined_question_is_cancelled_without_delivery() {
    let mut h = harness(&sample_fixture());
    let req = request(CommandInput::new("Top Hits").flag(flags::LIST));
    let mut delivered_count = 0;
    let mut sink = |_: Resolution| delivered_count += 1;

    let questions = &mut h.questions;
    let answer = async {
        questions.recv().await.expect("question asked").cancel();
    };

    let (result, ()) = tokio::join!(h.resolver.resolve_into(&req, &mut sink), answer);
    assert!(!result.unwrap());
    assert_eq!(delivered_count, 0);
}

#[tokio::test]
async fn cancel_token_ends_pending_question() {
    let mut h = harness(&sample_fixture());
    let req = request(CommandInput::new("Top Hits").flag(flags::LIST));
    let cancel = req.cancel.clone();

    let questions = &mut h.questions;
    let answer = async {
        let pending = questions.recv().await.expect("question asked");
        cancel.cancel();
        pending
    };

    let (outcome, _pending) = tokio::join!(h.resolver.resolve(&req), answer);
    assert!(outcome.unwrap().is_cancelled());

    let calls = h.providers.calls().await;
    assert!(calls.iter().all(|c| c.method != "get_playlist_tracks"));
}

#[tokio::test]
async fn cancel_during_login_wait_reaches_no_provider() {
    let h = harness_with_pending_login(&sample_fixture());
    let req = request(CommandInput::new("Saved").flag(flags::OWN));
    let cancel = req.cancel.clone();
    let mut delivered_count = 0;
    let mut sink = |_: Resolution| delivered_count += 1;

    let interrupt = async {
        tokio::task::yield_now().await;
        cancel.cancel();
    };

    let (result, ()) = tokio::join!(h.resolver.resolve_into(&req, &mut sink), interrupt);
    assert!(!result.unwrap());
    assert_eq!(delivered_count, 0);

    let calls = h.providers.calls().await;
    assert!(calls.iter().all(|c| !c.method.starts_with("search_")));
}

#[tokio::test]
async fn cancelled_login_wait_is_a_cancelled_outcome() {
    let h = harness_with_pending_login(&sample_fixture());
    let req = request(CommandInput::new("Top Hits").flag(flags::LIST).flag(flags::OWN));
    req.cancel.cancel();

    let outcome = h.resolver.resolve(&req).await.unwrap();
    assert!(outcome.is_cancelled());
    assert!(h.providers.calls().await.is_empty());
}

#[tokio::test]
async fn sink_receives_exactly_one_resolution() {
    let h = harness(&sample_fixture());
    let mut received = Vec::new();
    let mut sink = |r: Resolution| received.push(r);

    let called = h
        .resolver
        .resolve_into(&request(CommandInput::new("Imagine")), &mut sink)
        .await
        .unwrap();

    assert!(called);
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn failed_resolution_never_reaches_the_sink() {
    let h = harness(&sample_fixture());
    let mut received = Vec::new();
    let mut sink = |r: Resolution| received.push(r);

    let result = h
        .resolver
        .resolve_into(&request(CommandInput::new("Nothing At All")), &mut sink)
        .await;

    assert!(result.is_err());
    assert!(received.is_empty());
}

// ===== Redirect =====

#[tokio::test]
async fn redirect_resolves_catalog_track_to_stream() {
    let h = harness(&sample_fixture());
    let req = request(CommandInput::new("Imagine")).with_redirect(true);

    let resolution = delivered(h.resolver.resolve(&req).await.unwrap());
    let playable = &resolution.playables()[0];
    assert!(playable.is_deferred());

    match playable.playback_target().await.unwrap() {
        PlaybackTarget::Stream(stream) => {
            assert_eq!(stream.url, "https://www.youtube.com/watch?v=vid-imagine");
        }
        other => panic!("expected a stream, got {:?}", other),
    }
}

#[tokio::test]
async fn redirect_without_equivalent_is_unavailable() {
    let h = harness(&sample_fixture());
    let req = request(CommandInput::new("Hit D")).with_redirect(true);

    let resolution = delivered(h.resolver.resolve(&req).await.unwrap());
    let err = resolution.playables()[0].playback_target().await.unwrap_err();
    assert!(matches!(err, ResolveError::Unavailable(_)));
}

#[tokio::test]
async fn redirect_leaves_videos_untouched() {
    let h = harness(&sample_fixture());
    let input = CommandInput::new("party").flag(flags::LIST).flag(flags::LOCAL);
    let req = request(input).with_redirect(true);

    let resolution = delivered(h.resolver.resolve(&req).await.unwrap());
    assert!(!resolution.playables()[0].is_deferred());
    assert!(resolution.playables()[1].is_deferred());
}

#[tokio::test]
async fn default_provider_comes_from_config() {
    let config = ResolverConfig {
        default_provider: ProviderHint::Video,
        ..ResolverConfig::default()
    };
    let h = harness_with(&json!({ "videos": [
        { "id": "v9", "title": "Imagine live", "channel_title": "Fan", "duration_ms": 1 }
    ]}), config);

    let resolution = delivered(
        h.resolver
            .resolve(&request(CommandInput::new("Imagine")))
            .await
            .unwrap(),
    );
    assert_eq!(ids(&resolution), vec!["v9"]);
}
