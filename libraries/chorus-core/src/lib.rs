//! Chorus Core
//!
//! Platform-agnostic types, collaborator traits and error handling for
//! resolving audio requests into playables.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: provider results (`Track`, `Video`, `AudioTrack`, ...),
//!   the uniform `Playable`, and the `LoadedEntity` a resolution records
//! - **Collaborator Traits**: `CatalogProvider`, `VideoProvider`,
//!   `PeerAudioProvider`, `LocalPlaylistStore`, `UrlLoader`, `LoginProvider`,
//!   `TrackLoadingExecutor`
//! - **Error Handling**: Unified `ResolveError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chorus_core::types::{flags, CommandInput, ProviderHint};
//!
//! let input = CommandInput::new("Top Hits")
//!     .flag(flags::LIST)
//!     .flag_value(flags::SELECT, "5");
//!
//! assert_eq!(input.provider_hint(ProviderHint::Catalog), ProviderHint::Catalog);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{NotFoundKind, ResolveError, Result};
pub use traits::{
    CatalogProvider, InputSyntax, LocalPlaylistStore, LoginProvider, PeerAudioProvider,
    RedirectTask, Redirector, TrackLoadingExecutor, UrlLoader, VideoProvider,
};
pub use types::{
    CommandInput, CredentialContext, LoadedEntity, Outcome, Playable, Requester, Resolution,
    Source,
};
