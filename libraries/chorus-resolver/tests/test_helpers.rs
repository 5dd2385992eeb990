#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::types::{CommandInput, Login, Requester, RequesterId};
use chorus_core::{LoginProvider, Result};
use chorus_resolver::gate::PendingQuestion;
use chorus_resolver::memory::MemoryProviders;
use chorus_resolver::{
    BoundedRedirectExecutor, ChannelDisambiguator, PlayableResolver, ResolveRequest,
    ResolverConfig, StandardSyntax,
};
use serde_json::{json, Value};
use std::sync::{Arc, Once};
use tokio::sync::mpsc;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub struct Harness {
    pub resolver: PlayableResolver,
    pub providers: Arc<MemoryProviders>,
    pub questions: mpsc::Receiver<PendingQuestion>,
}

/// Resolver over `fixture`; must be called inside a tokio runtime
pub fn harness_with(fixture: &Value, config: ResolverConfig) -> Harness {
    init_tracing();

    let providers =
        Arc::new(MemoryProviders::from_json(&fixture.to_string()).expect("valid fixture"));
    let executor = BoundedRedirectExecutor::new(providers.clone(), config.redirect_concurrency)
        .expect("inside a runtime");
    let (disambiguator, questions) = ChannelDisambiguator::channel(4);

    let collaborators = providers.collaborators(
        Arc::new(StandardSyntax::new(config.catalog_uri_scheme.clone())),
        Arc::new(executor),
        Arc::new(disambiguator),
    );

    Harness {
        resolver: PlayableResolver::new(config, collaborators),
        providers,
        questions,
    }
}

/// Login flow that never finishes
pub struct PendingLogin;

#[async_trait]
impl LoginProvider for PendingLogin {
    async fn await_login(&self, _requester: &RequesterId) -> Result<Option<Login>> {
        std::future::pending().await
    }
}

/// Resolver whose requester logins never complete
pub fn harness_with_pending_login(fixture: &Value) -> Harness {
    init_tracing();

    let config = ResolverConfig::default();
    let providers =
        Arc::new(MemoryProviders::from_json(&fixture.to_string()).expect("valid fixture"));
    let executor = BoundedRedirectExecutor::new(providers.clone(), config.redirect_concurrency)
        .expect("inside a runtime");
    let (disambiguator, questions) = ChannelDisambiguator::channel(4);

    let mut collaborators = providers.collaborators(
        Arc::new(StandardSyntax::new(config.catalog_uri_scheme.clone())),
        Arc::new(executor),
        Arc::new(disambiguator),
    );
    collaborators.logins = Arc::new(PendingLogin);

    Harness {
        resolver: PlayableResolver::new(config, collaborators),
        providers,
        questions,
    }
}

pub fn harness(fixture: &Value) -> Harness {
    harness_with(fixture, ResolverConfig::default())
}

pub fn request(input: CommandInput) -> ResolveRequest {
    ResolveRequest::new(input, Requester::new("u1", "guild-1"))
}

pub fn artist(name: &str) -> Value {
    json!({ "id": name.to_lowercase().replace(' ', "-"), "name": name })
}

pub fn track(id: &str, name: &str, artist_name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [artist(artist_name)],
        "duration_ms": 180_000,
        "popularity": 50
    })
}

pub fn audio(identifier: &str, title: &str) -> Value {
    json!({
        "identifier": identifier,
        "title": title,
        "author": "beatmaker",
        "uri": format!("https://peer.example.com/{}", identifier),
        "duration_ms": 120_000
    })
}

/// Small catalog covering every provider
pub fn sample_fixture() -> Value {
    json!({
        "tracks": [
            track("imagine", "Imagine", "John Lennon"),
            track("hit-a", "Hit A", "Artist A"),
            track("hit-b", "Hit B", "Artist B"),
            {
                "id": "hit-c", "name": "Hit C", "artists": [artist("Artist C")],
                "album": { "id": "abbey", "name": "Abbey Road" }, "duration_ms": 180_000
            },
            track("hit-d", "Hit D", "Artist D"),
            {
                "id": "saved-1", "name": "Saved Song", "artists": [artist("Someone")],
                "duration_ms": 1000, "saved": true
            }
        ],
        "albums": [
            {
                "id": "abbey", "name": "Abbey Road", "artists": [artist("The Beatles")],
                "tracks": ["hit-c", "hit-a", "hit-b"]
            },
            { "id": "empty-album", "name": "Silence", "artists": [], "tracks": [] }
        ],
        "playlists": [
            { "id": "p1", "name": "Top Hits 2019", "owner": "dj", "track_count": 2, "items": ["hit-a", "hit-b"] },
            { "id": "p2", "name": "Top Hits 2020", "owner": "dj", "track_count": 3, "items": ["hit-c", "hit-a", "hit-d"] },
            { "id": "p3", "name": "Top Hits 2021", "owner": "dj", "track_count": 1, "items": ["hit-d"] },
            { "id": "mine", "name": "Road Trip", "owner": "u1", "track_count": 2, "items": ["hit-b", "hit-a"], "owned_by": "u1" }
        ],
        "episodes": [
            {
                "id": "ep1", "name": "Deep Dive", "show": { "id": "show1", "name": "Tech Talk" },
                "duration_ms": 3_600_000
            },
            {
                "id": "ep2", "name": "Follow Up", "show": { "id": "show1", "name": "Tech Talk" },
                "duration_ms": 1_800_000
            }
        ],
        "shows": [
            { "id": "show1", "name": "Tech Talk", "publisher": "Talk Co", "episodes": ["ep2", "ep1"] }
        ],
        "videos": [
            { "id": "vid-imagine", "title": "John Lennon - Imagine", "channel_title": "Lennon", "duration_ms": 184_000 },
            { "id": "vid-cat-1", "title": "Funny cat compilation", "channel_title": "Cats", "duration_ms": 60_000 },
            { "id": "vid-cat-2", "title": "Funny cat fails", "channel_title": "Cats", "duration_ms": 70_000 },
            { "id": "vid-cat-3", "title": "Funny cat reactions", "channel_title": "More Cats", "duration_ms": 80_000 }
        ],
        "video_playlists": [
            { "id": "vpl1", "title": "Cat Videos", "channel_title": "Cats", "video_count": 2, "videos": ["vid-cat-2", "vid-cat-1"] }
        ],
        "peer_audio": {
            "scsearch:rain": { "type": "track", "identifier": "rain-1", "title": "Rain", "author": "ambient", "uri": "https://peer.example.com/rain-1", "duration_ms": 1000 },
            "scsearch:mixtape": {
                "type": "collection", "name": "Summer Mixtape",
                "tracks": [audio("m1", "First"), audio("m2", "Second")]
            }
        },
        "local_playlists": [
            {
                "scope": "guild-1", "id": "l1", "name": "Party", "created_by": "u2",
                "items": [
                    { "type": "video", "id": "vid-cat-1", "title": "Funny cat compilation", "channel_title": "Cats", "duration_ms": 60_000 },
                    { "type": "track", "id": "imagine", "name": "Imagine", "artists": [artist("John Lennon")], "duration_ms": 183_000 }
                ]
            },
            { "scope": "guild-1", "id": "l2", "name": "Empty", "created_by": "u2", "items": [] },
            { "scope": "guild-2", "id": "l3", "name": "Chill", "created_by": "u3", "items": [] }
        ],
        "urls": {
            "https://music.example.com/set/42": [
                { "type": "audio", "identifier": "u-1", "title": "Live Set", "author": "dj", "uri": "https://music.example.com/set/42.mp3", "duration_ms": 5000 }
            ]
        },
        "logins": [{ "requester": "u1", "access_token": "token-u1" }]
    })
}

/// Peer-audio search collection with `hits` results for `query`
pub fn peer_search_fixture(query: &str, hits: usize) -> Value {
    let tracks: Vec<Value> = (1..=hits)
        .map(|i| audio(&format!("{}-{}", query, i), &format!("{} #{}", query, i)))
        .collect();

    let mut peer_audio = serde_json::Map::new();
    peer_audio.insert(
        format!("scsearch:{}", query),
        json!({ "type": "collection", "name": format!("Search: {}", query), "tracks": tracks }),
    );

    json!({ "peer_audio": Value::Object(peer_audio) })
}
