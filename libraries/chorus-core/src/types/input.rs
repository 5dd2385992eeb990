//! Command input
//!
//! The raw text of a request plus the flags the command layer recognised.
//! Flag parsing itself belongs to the command layer; this is only the
//! already-parsed result.

use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Recognised flag names
pub mod flags {
    pub const LIST: &str = "list";
    pub const ALBUM: &str = "album";
    pub const EPISODE: &str = "episode";
    pub const PODCAST: &str = "podcast";
    pub const SELECT: &str = "select";
    pub const OWN: &str = "own";

    // Provider hints
    pub const SPOTIFY: &str = "spotify";
    pub const YOUTUBE: &str = "youtube";
    pub const SOUNDCLOUD: &str = "soundcloud";
    pub const LOCAL: &str = "local";
}

/// Provider family a keyword search should go to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderHint {
    Catalog,
    Video,
    PeerAudio,
    Local,
}

impl FromStr for ProviderHint {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "catalog" | "spotify" => Ok(Self::Catalog),
            "video" | "youtube" => Ok(Self::Video),
            "peer-audio" | "soundcloud" => Ok(Self::PeerAudio),
            "local" => Ok(Self::Local),
            other => Err(ResolveError::invalid_input(format!(
                "Unknown provider '{}'",
                other
            ))),
        }
    }
}

/// Flags set on a command, each with an optional value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentSet(BTreeMap<String, Option<String>>);

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>) {
        self.0.insert(name.into(), None);
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), Some(value.into()));
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn raw_value(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_deref())
    }

    /// Typed value of a flag
    ///
    /// `Ok(None)` when the flag is absent or carries no value.
    pub fn value_as<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.raw_value(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
                ResolveError::invalid_input(format!(
                    "Invalid value '{}' for argument '{}': {}",
                    raw, name, e
                ))
            }),
        }
    }
}

/// Immutable raw request text plus recognised flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInput {
    text: String,
    arguments: ArgumentSet,
}

impl CommandInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            arguments: ArgumentSet::new(),
        }
    }

    /// Builder: set a flag without value
    pub fn flag(mut self, name: &str) -> Self {
        self.arguments.set(name);
        self
    }

    /// Builder: set a flag with a value
    pub fn flag_value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.arguments.set_value(name, value);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn arguments(&self) -> &ArgumentSet {
        &self.arguments
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.arguments.is_set(name)
    }

    /// Provider hint from the flags, falling back to `default`
    pub fn provider_hint(&self, default: ProviderHint) -> ProviderHint {
        if self.is_set(flags::SPOTIFY) {
            ProviderHint::Catalog
        } else if self.is_set(flags::YOUTUBE) {
            ProviderHint::Video
        } else if self.is_set(flags::SOUNDCLOUD) {
            ProviderHint::PeerAudio
        } else if self.is_set(flags::LOCAL) {
            ProviderHint::Local
        } else {
            default
        }
    }
}
