mod catalog;
mod credentials;
mod ids;
mod input;
mod loaded;
mod local;
mod media;
mod playable;
mod source;

pub use catalog::{
    AlbumRef, AlbumSummary, ArtistRef, CatalogItem, Episode, PlaylistSummary, ShowRef,
    ShowSummary, Track,
};
pub use credentials::{CredentialContext, Login};
pub use ids::{Requester, RequesterId, ScopeId};
pub use input::{flags, ArgumentSet, CommandInput, ProviderHint};
pub use loaded::{LoadedEntity, Outcome, Resolution};
pub use local::{LocalPlaylist, PlaylistItem};
pub use media::{AudioCollection, AudioItem, AudioTrack, Video, VideoPlaylist};
pub use playable::{
    deferred, DeferredAudio, DeferredSlot, PlaybackTarget, Playable, PlayableAudio,
    PlayableOrigin, StreamInfo,
};
pub use source::{Source, UriDescriptor, UriKind};
