//! Provider payload → internal model.
//!
//! Missing-field policy (same for every provider):
//!   - an item with no identity (missing or blank track id / videoId /
//!     channel id) is skipped, it cannot be addressed later;
//!   - any other missing display field becomes `""`.
//!
//! All functions here are pure: the same payload always yields the same output.

use anyhow::Context;
use tracing::debug;

use crate::model::{Song, SpotifySearchResult, YouTubeChannel, YouTubeSearchResult};
use crate::providers::{
    SpotifyApiResponse, SpotifyImage, SpotifyTrackItem, YouTubeChannelItem,
    YouTubeChannelResponse, YouTubeSearchItem, YouTubeSearchResponse, YouTubeThumbnails,
};

const ARTIST_SEPARATOR: &str = ", ";

// ── Spotify ───────────────────────────────────────────────────────────────────

pub fn normalize_spotify(resp: &SpotifyApiResponse) -> Vec<SpotifySearchResult> {
    let Some(page) = &resp.tracks else {
        return Vec::new();
    };
    let results: Vec<_> = page.items.iter().filter_map(normalize_spotify_track).collect();
    debug!(
        "[normalize] spotify: {} of {} items kept",
        results.len(),
        page.items.len()
    );
    results
}

fn normalize_spotify_track(item: &SpotifyTrackItem) -> Option<SpotifySearchResult> {
    let id = nn(item.id.as_deref())?;

    let artist = item
        .artists
        .iter()
        .filter_map(|a| nn(a.name.as_deref()))
        .collect::<Vec<_>>()
        .join(ARTIST_SEPARATOR);

    let (album_name, album_image_url) = match &item.album {
        Some(album) => (
            text(album.name.as_deref()),
            largest_image(&album.images).unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    Some(SpotifySearchResult {
        id,
        title: text(item.name.as_deref()),
        artist,
        album_name,
        album_image_url,
        preview_url: nn(item.preview_url.as_deref()),
    })
}

/// Largest image by pixel area; ties and unknown sizes keep API order, so with
/// no dimensions at all this is the first image.
fn largest_image(images: &[SpotifyImage]) -> Option<String> {
    let mut best: Option<(u64, String)> = None;
    for img in images {
        let Some(url) = nn(img.url.as_deref()) else {
            continue;
        };
        let area = u64::from(img.width.unwrap_or(0)) * u64::from(img.height.unwrap_or(0));
        let better = best.as_ref().map_or(true, |(best_area, _)| area > *best_area);
        if better {
            best = Some((area, url));
        }
    }
    best.map(|(_, url)| url)
}

// ── YouTube ───────────────────────────────────────────────────────────────────

pub fn normalize_youtube(resp: &YouTubeSearchResponse) -> Vec<YouTubeSearchResult> {
    let results: Vec<_> = resp.items.iter().filter_map(normalize_youtube_item).collect();
    debug!(
        "[normalize] youtube: {} of {} items kept",
        results.len(),
        resp.items.len()
    );
    results
}

fn normalize_youtube_item(item: &YouTubeSearchItem) -> Option<YouTubeSearchResult> {
    let id = nn(item.id.as_ref().and_then(|i| i.video_id.as_deref()))?;
    let snippet = item.snippet.as_ref();

    Some(YouTubeSearchResult {
        id,
        title: text(snippet.and_then(|s| s.title.as_deref())),
        channel_title: text(snippet.and_then(|s| s.channel_title.as_deref())),
        thumbnail_url: best_thumbnail(snippet.and_then(|s| s.thumbnails.as_ref())),
    })
}

pub fn normalize_youtube_channels(resp: &YouTubeChannelResponse) -> Vec<YouTubeChannel> {
    resp.items.iter().filter_map(normalize_youtube_channel).collect()
}

fn normalize_youtube_channel(item: &YouTubeChannelItem) -> Option<YouTubeChannel> {
    let id = nn(item.id.as_deref())?;
    let snippet = item.snippet.as_ref();

    let subscriber_count = item
        .statistics
        .as_ref()
        .filter(|s| !s.hidden_subscriber_count.unwrap_or(false))
        .and_then(|s| s.subscriber_count.as_deref())
        .and_then(|c| c.trim().parse::<u64>().ok());

    Some(YouTubeChannel {
        id,
        title: text(snippet.and_then(|s| s.title.as_deref())),
        description: text(snippet.and_then(|s| s.description.as_deref())),
        thumbnail_url: best_thumbnail(snippet.and_then(|s| s.thumbnails.as_ref())),
        subscriber_count,
    })
}

/// Preference: high > medium > default.
fn best_thumbnail(thumbs: Option<&YouTubeThumbnails>) -> String {
    let Some(t) = thumbs else {
        return String::new();
    };
    [&t.high, &t.medium, &t.default]
        .into_iter()
        .find_map(|thumb| nn(thumb.as_ref().and_then(|th| th.url.as_deref())))
        .unwrap_or_default()
}

// ── Song view ─────────────────────────────────────────────────────────────────

impl From<SpotifySearchResult> for Song {
    fn from(r: SpotifySearchResult) -> Self {
        Song {
            id: r.id,
            title: r.title,
            artist: r.artist,
            album_cover: r.album_image_url,
            ..Song::default()
        }
    }
}

impl From<YouTubeSearchResult> for Song {
    fn from(r: YouTubeSearchResult) -> Self {
        Song {
            id: r.id,
            title: r.title,
            artist: r.channel_title,
            album_cover: r.thumbnail_url,
            ..Song::default()
        }
    }
}

pub fn songs_from_spotify(resp: &SpotifyApiResponse) -> Vec<Song> {
    normalize_spotify(resp).into_iter().map(Song::from).collect()
}

pub fn songs_from_youtube(resp: &YouTubeSearchResponse) -> Vec<Song> {
    normalize_youtube(resp).into_iter().map(Song::from).collect()
}

// ── Payload parsing ───────────────────────────────────────────────────────────

pub fn parse_spotify(json: &str) -> anyhow::Result<SpotifyApiResponse> {
    serde_json::from_str(json).context("Failed to parse Spotify search response")
}

pub fn parse_youtube(json: &str) -> anyhow::Result<YouTubeSearchResponse> {
    serde_json::from_str(json).context("Failed to parse YouTube search response")
}

pub fn parse_youtube_channels(json: &str) -> anyhow::Result<YouTubeChannelResponse> {
    serde_json::from_str(json).context("Failed to parse YouTube channel response")
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn nn(s: Option<&str>) -> Option<String> {
    let t = s?.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

fn text(s: Option<&str>) -> String {
    nn(s).unwrap_or_default()
}
