//! Raw Spotify / YouTube API payloads.
//!
//! These types only exist as normalizer input and are never persisted. Every
//! field is optional and every item list is decoded leniently: an element that
//! does not match the expected shape is dropped with a warning instead of
//! failing the whole payload.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ── Spotify ───────────────────────────────────────────────────────────────────

/// `GET /v1/search?type=track`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyApiResponse {
    #[serde(default)]
    pub tracks: Option<SpotifyTrackPage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyTrackPage {
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<SpotifyTrackItem>,
    pub total: Option<u64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyTrackItem {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
    pub preview_url: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

// ── YouTube ───────────────────────────────────────────────────────────────────

/// `GET /youtube/v3/search?part=snippet&type=video`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSearchResponse {
    pub kind: Option<String>,
    pub next_page_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTubeSearchItem {
    pub id: Option<YouTubeSearchId>,
    pub snippet: Option<YouTubeSnippet>,
}

/// Search hits can be videos, channels or playlists; only videos carry `videoId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSearchId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<String>,
    pub thumbnails: Option<YouTubeThumbnails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTubeThumbnails {
    pub default: Option<YouTubeThumbnail>,
    pub medium: Option<YouTubeThumbnail>,
    pub high: Option<YouTubeThumbnail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTubeThumbnail {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// `GET /youtube/v3/channels?part=snippet,statistics`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTubeChannelResponse {
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<YouTubeChannelItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTubeChannelItem {
    pub id: Option<String>,
    pub snippet: Option<YouTubeChannelSnippet>,
    pub statistics: Option<YouTubeChannelStatistics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTubeChannelSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnails: Option<YouTubeThumbnails>,
}

/// The Data API reports counts as decimal strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeChannelStatistics {
    pub subscriber_count: Option<String>,
    pub hidden_subscriber_count: Option<bool>,
    pub video_count: Option<String>,
}

// ── Lenient list decoding ─────────────────────────────────────────────────────

fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let items = match raw {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Null => return Ok(Vec::new()),
        other => {
            warn!("[providers] expected a list, got {}; treating as empty", json_kind(&other));
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<T>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("[providers] skipping malformed item #{}: {}", idx, e);
                None
            }
        })
        .collect())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null      => "null",
        serde_json::Value::Bool(_)   => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_)  => "array",
        serde_json::Value::Object(_) => "object",
    }
}
