//! Resolver configuration
use chorus_core::types::ProviderHint;
use chorus_core::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Results requested by `select` video and video playlist searches
    #[serde(default = "default_video_search_limit")]
    pub video_search_limit: usize,

    /// Results requested by catalog track/album/playlist/episode/show searches
    #[serde(default = "default_catalog_search_limit")]
    pub catalog_search_limit: usize,

    /// Candidates kept from a peer-audio search collection
    #[serde(default = "default_peer_audio_limit")]
    pub peer_audio_limit: usize,

    /// Prefix turning free text into a peer-audio search identifier
    #[serde(default = "default_peer_audio_search_prefix")]
    pub peer_audio_search_prefix: String,

    /// Scheme of provider URIs (`scheme:kind:id`)
    #[serde(default = "default_catalog_uri_scheme")]
    pub catalog_uri_scheme: String,

    /// Provider used when a request names none
    #[serde(default = "default_provider")]
    pub default_provider: ProviderHint,

    /// Background redirects allowed to run at once
    #[serde(default = "default_redirect_concurrency")]
    pub redirect_concurrency: usize,

    /// Pick the best catalog track match instead of asking, unless `select` is set
    #[serde(default)]
    pub auto_pick_best_track: bool,

    /// Give up waiting for a requester login after this many seconds
    #[serde(default)]
    pub login_timeout_secs: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            video_search_limit: default_video_search_limit(),
            catalog_search_limit: default_catalog_search_limit(),
            peer_audio_limit: default_peer_audio_limit(),
            peer_audio_search_prefix: default_peer_audio_search_prefix(),
            catalog_uri_scheme: default_catalog_uri_scheme(),
            default_provider: default_provider(),
            redirect_concurrency: default_redirect_concurrency(),
            auto_pick_best_track: false,
            login_timeout_secs: None,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// `CHORUS_*` environment variables override file values
    /// (e.g. `CHORUS_CATALOG_SEARCH_LIMIT=50`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(config::Environment::with_prefix("CHORUS").try_parsing(true));

        let config = settings
            .build()
            .map_err(|e| ResolveError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| ResolveError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.video_search_limit == 0
            || self.catalog_search_limit == 0
            || self.peer_audio_limit == 0
        {
            return Err(ResolveError::Config(
                "search limits must be greater than zero".to_string(),
            ));
        }

        if self.redirect_concurrency == 0 {
            return Err(ResolveError::Config(
                "redirect_concurrency must be greater than zero".to_string(),
            ));
        }

        if self.catalog_uri_scheme.is_empty() || self.catalog_uri_scheme.contains(':') {
            return Err(ResolveError::Config(format!(
                "invalid catalog_uri_scheme '{}'",
                self.catalog_uri_scheme
            )));
        }

        Ok(())
    }

    pub fn login_timeout(&self) -> Option<Duration> {
        self.login_timeout_secs.map(Duration::from_secs)
    }
}

fn default_video_search_limit() -> usize {
    10
}

fn default_catalog_search_limit() -> usize {
    20
}

fn default_peer_audio_limit() -> usize {
    20
}

fn default_peer_audio_search_prefix() -> String {
    "scsearch:".to_string()
}

fn default_catalog_uri_scheme() -> String {
    "spotify".to_string()
}

fn default_provider() -> ProviderHint {
    ProviderHint::Catalog
}

fn default_redirect_concurrency() -> usize {
    4
}
