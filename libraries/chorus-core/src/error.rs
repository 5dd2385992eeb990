//! Core error types for Chorus
use thiserror::Error;

/// Result type alias using `ResolveError`
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Which family of lookup came back empty.
///
/// Callers use this to phrase messages: catalog misses name the catalog
/// provider, everything else gets a generic "nothing found".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// Direct URL, video, local playlist or peer-audio lookups
    Generic,
    /// Any search or lookup backed by the streaming catalog
    CatalogSpecific,
}

/// Core error type for playable resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A lookup produced zero results
    #[error("{message}")]
    NotFound { kind: NotFoundKind, message: String },

    /// An "own"-scoped operation needs a completed login for the requester
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// A deferred playable was interrogated after its resolution failed or was interrupted
    #[error("Playable unavailable: {0}")]
    Unavailable(String),

    /// Malformed command input (bad flag value, bad provider URI)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A provider collaborator failed
    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requester cancelled while the flow was suspended
    #[error("Cancelled")]
    Cancelled,

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ResolveError {
    /// Create a generic not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            kind: NotFoundKind::Generic,
            message: msg.into(),
        }
    }

    /// Create a catalog-specific not found error
    pub fn catalog_not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            kind: NotFoundKind::CatalogSpecific,
            message: msg.into(),
        }
    }

    /// Create a provider error
    pub fn provider(provider: &'static str, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: msg.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// The not-found kind, if this is a not-found error
    pub fn not_found_kind(&self) -> Option<NotFoundKind> {
        match self {
            Self::NotFound { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
