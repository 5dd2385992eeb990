//! Source classification
//!
//! Decides which resolution path a request takes. Precedence is fixed:
//!
//! 1. absolute URL
//! 2. provider URI
//! 3. `list` flag, sub-selected by provider hint (catalog, video, else local)
//! 4. `episode` flag
//! 5. `podcast` flag
//! 6. provider hint for single items (video, peer audio), then `album`,
//!    then catalog track
//!
//! Explicit identifiers always pre-empt keyword search; among keyword
//! searches the most explicit flag wins.

use chorus_core::types::{flags, CommandInput, ProviderHint, Source, UriDescriptor};
use chorus_core::{InputSyntax, Result};
use url::Url;

/// Classify a request
pub fn classify(input: &CommandInput, syntax: &dyn InputSyntax, default_hint: ProviderHint) -> Source {
    let text = input.text();

    if syntax.is_absolute_url(text) {
        return Source::DirectUrl;
    }

    if syntax.is_provider_uri(text) {
        return Source::ProviderUri;
    }

    let hint = input.provider_hint(default_hint);

    if input.is_set(flags::LIST) {
        return match hint {
            ProviderHint::Catalog => Source::CatalogList,
            ProviderHint::Video => Source::VideoList,
            ProviderHint::PeerAudio | ProviderHint::Local => Source::LocalList,
        };
    }

    if input.is_set(flags::EPISODE) {
        return Source::CatalogEpisode;
    }

    if input.is_set(flags::PODCAST) {
        return Source::CatalogShow;
    }

    match hint {
        ProviderHint::Video => Source::VideoSingle,
        ProviderHint::PeerAudio => Source::PeerAudio,
        ProviderHint::Catalog | ProviderHint::Local if input.is_set(flags::ALBUM) => {
            Source::CatalogAlbum
        }
        ProviderHint::Catalog | ProviderHint::Local => Source::CatalogTrack,
    }
}

/// URL and provider URI syntax
///
/// Absolute URLs are `http`, `https` or `ftp` URLs with a host and no
/// whitespace. Provider URIs are `scheme:kind:id`.
#[derive(Debug, Clone)]
pub struct StandardSyntax {
    catalog_scheme: String,
}

impl StandardSyntax {
    pub fn new(catalog_scheme: impl Into<String>) -> Self {
        Self {
            catalog_scheme: catalog_scheme.into(),
        }
    }
}

impl InputSyntax for StandardSyntax {
    fn is_absolute_url(&self, input: &str) -> bool {
        if input.is_empty() || input.contains(char::is_whitespace) {
            return false;
        }

        match Url::parse(input) {
            Ok(url) => {
                matches!(url.scheme(), "http" | "https" | "ftp")
                    && url.host_str().is_some_and(|h| !h.is_empty())
            }
            Err(_) => false,
        }
    }

    fn is_provider_uri(&self, input: &str) -> bool {
        UriDescriptor::matches(&self.catalog_scheme, input)
    }

    fn parse_provider_uri(&self, input: &str) -> Result<UriDescriptor> {
        UriDescriptor::parse(&self.catalog_scheme, input)
    }

    fn catalog_scheme(&self) -> &str {
        &self.catalog_scheme
    }
}
