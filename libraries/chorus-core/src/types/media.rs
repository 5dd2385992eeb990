//! Video service and peer-hosted audio types

use serde::{Deserialize, Serialize};

/// Video from the video search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub duration_ms: u64,
}

impl Video {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Video playlist as returned by a playlist search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPlaylist {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    #[serde(default)]
    pub video_count: u32,
}

/// Raw audio track from the peer-hosted audio service or a direct URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub uri: String,
    pub duration_ms: u64,
}

/// Several audio tracks returned by one lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioCollection {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<AudioTrack>,
}

/// Result of a peer-audio identifier lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AudioItem {
    Track(AudioTrack),
    Collection(AudioCollection),
}
