//! Resolution paths and provider URIs

use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The resolution path a request takes
///
/// Exactly one is chosen per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    DirectUrl,
    ProviderUri,
    CatalogList,
    CatalogAlbum,
    CatalogTrack,
    CatalogEpisode,
    CatalogShow,
    VideoList,
    VideoSingle,
    PeerAudio,
    LocalList,
}

impl Source {
    /// Whether empty results on this path are catalog-specific misses
    pub fn is_catalog(self) -> bool {
        matches!(
            self,
            Self::ProviderUri
                | Self::CatalogList
                | Self::CatalogAlbum
                | Self::CatalogTrack
                | Self::CatalogEpisode
                | Self::CatalogShow
        )
    }
}

/// Kind of entity a provider URI points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UriKind {
    Track,
    Album,
    Playlist,
    Episode,
    Show,
}

impl FromStr for UriKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "track" => Ok(Self::Track),
            "album" => Ok(Self::Album),
            "playlist" => Ok(Self::Playlist),
            "episode" => Ok(Self::Episode),
            "show" => Ok(Self::Show),
            other => Err(ResolveError::invalid_input(format!(
                "Unsupported URI type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for UriKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Episode => "episode",
            Self::Show => "show",
        };
        f.write_str(s)
    }
}

/// Parsed provider URI (`scheme:kind:id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UriDescriptor {
    pub kind: UriKind,
    pub id: String,
}

impl UriDescriptor {
    /// Parse `scheme:kind:id`
    ///
    /// Playlist URIs of the legacy `scheme:user:<name>:playlist:<id>` form are
    /// accepted too.
    pub fn parse(scheme: &str, input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.trim().split(':').collect();
        let invalid = || ResolveError::invalid_input(format!("'{}' is not a valid {} URI", input, scheme));

        match parts.as_slice() {
            [s, kind, id] if *s == scheme => {
                let kind = kind.parse::<UriKind>()?;
                Self::checked(kind, id).ok_or_else(invalid)
            }
            [s, "user", _, "playlist", id] if *s == scheme => {
                Self::checked(UriKind::Playlist, id).ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }

    /// Whether `input` parses as a URI of `scheme` with a known kind and a valid id
    pub fn matches(scheme: &str, input: &str) -> bool {
        Self::parse(scheme, input).is_ok()
    }

    pub fn format(&self, scheme: &str) -> String {
        format!("{}:{}:{}", scheme, self.kind, self.id)
    }

    fn checked(kind: UriKind, id: &str) -> Option<Self> {
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(Self {
                kind,
                id: id.to_string(),
            })
        } else {
            None
        }
    }
}
