//! Search flow: transport → normalizer → history, guarded against stale results.
//!
//! Each UI context owns a `SearchScope`. Closing (or dropping) the scope
//! cancels its in-flight searches; a result that completes after that is
//! discarded without touching any state. Searches may resolve in any order:
//! every outcome carries the `SearchTicket` it was issued with and
//! `SearchScope::is_current` tells the caller whether it is still the latest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::history::SearchHistoryTracker;
use crate::model::{SearchHistory, Song, SpotifySearchResult, YouTubeChannel, YouTubeSearchResult};
use crate::normalize::{normalize_spotify, normalize_youtube, normalize_youtube_channels};
use crate::providers::{SpotifyApiResponse, YouTubeChannelResponse, YouTubeSearchResponse};

/// Raw provider transport. Implementations return the documented API shapes.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn search_spotify(&self, query: &str) -> anyhow::Result<SpotifyApiResponse>;
    async fn search_youtube(&self, query: &str) -> anyhow::Result<YouTubeSearchResponse>;
    async fn youtube_channels(&self, channel_ids: &[String]) -> anyhow::Result<YouTubeChannelResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provider {
    Spotify,
    YouTube,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::YouTube => "youtube",
        }
    }
}

/// Transport-level failure of one provider during a search.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub provider: Provider,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

// ── SearchScope ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SearchScope {
    token: CancellationToken,
    generation: AtomicU64,
}

impl SearchScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if `ticket` is the most recently issued one and the scope is open.
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        !self.is_closed() && self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for SearchScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ── SearchOutcome ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub ticket: SearchTicket,
    pub query: String,
    pub spotify: Vec<SpotifySearchResult>,
    pub youtube: Vec<YouTubeSearchResult>,
    pub failures: Vec<ProviderFailure>,
}

impl SearchOutcome {
    /// Spotify hits first, then YouTube.
    pub fn songs(&self) -> Vec<Song> {
        self.spotify
            .iter()
            .cloned()
            .map(Song::from)
            .chain(self.youtube.iter().cloned().map(Song::from))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spotify.is_empty() && self.youtube.is_empty()
    }
}

// ── SearchService ─────────────────────────────────────────────────────────────

pub struct SearchService {
    client: Arc<dyn ProviderClient>,
    history: RwLock<SearchHistoryTracker>,
}

impl SearchService {
    pub fn new(client: Arc<dyn ProviderClient>, history_cap: usize) -> Self {
        Self::with_history(client, SearchHistoryTracker::new(history_cap))
    }

    pub fn with_history(client: Arc<dyn ProviderClient>, history: SearchHistoryTracker) -> Self {
        Self {
            client,
            history: RwLock::new(history),
        }
    }

    pub async fn history(&self) -> Vec<SearchHistory> {
        self.history.read().await.list().to_vec()
    }

    pub async fn remove_history(&self, id: &str) -> bool {
        self.history.write().await.remove(id)
    }

    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }

    /// Record `query`, query both providers concurrently and normalize.
    ///
    /// Returns `None` for a blank query or when `scope` was closed before the
    /// providers answered. One provider failing does not hide the other's
    /// results; the failure is listed in `SearchOutcome::failures`.
    pub async fn search(&self, scope: &SearchScope, query: &str) -> Option<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() || scope.is_closed() {
            return None;
        }

        let ticket = scope.issue();
        self.history.write().await.record(query);
        info!("[search] {:?} issued as #{}", query, ticket.0);

        let token = scope.token();
        let (spotify, youtube) = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("[search] #{} cancelled before providers answered", ticket.0);
                return None;
            }
            res = async {
                tokio::join!(self.client.search_spotify(query), self.client.search_youtube(query))
            } => res,
        };

        let mut failures = Vec::new();
        let spotify = match spotify {
            Ok(resp) => normalize_spotify(&resp),
            Err(e) => {
                failures.push(failure(Provider::Spotify, &e));
                Vec::new()
            }
        };
        let youtube = match youtube {
            Ok(resp) => normalize_youtube(&resp),
            Err(e) => {
                failures.push(failure(Provider::YouTube, &e));
                Vec::new()
            }
        };

        debug!(
            "[search] #{} done: spotify={} youtube={} failures={}",
            ticket.0,
            spotify.len(),
            youtube.len(),
            failures.len()
        );

        Some(SearchOutcome {
            ticket,
            query: query.to_string(),
            spotify,
            youtube,
            failures,
        })
    }

    /// Channel details for YouTube results. `Ok(None)` when `scope` closed first.
    pub async fn channel_details(
        &self,
        scope: &SearchScope,
        channel_ids: &[String],
    ) -> anyhow::Result<Option<Vec<YouTubeChannel>>> {
        if channel_ids.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let token = scope.token();
        let resp = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(None),
            res = self.client.youtube_channels(channel_ids) => res?,
        };
        Ok(Some(normalize_youtube_channels(&resp)))
    }
}

fn failure(provider: Provider, e: &anyhow::Error) -> ProviderFailure {
    warn!("[search] {} request failed: {:#}", provider.label(), e);
    ProviderFailure {
        provider,
        message: format!("{:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct FakeClient {
        hang: bool,
        spotify_down: bool,
    }

    #[async_trait]
    impl ProviderClient for FakeClient {
        async fn search_spotify(&self, query: &str) -> anyhow::Result<SpotifyApiResponse> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.spotify_down {
                anyhow::bail!("connection refused");
            }
            Ok(serde_json::from_value(json!({ "tracks": { "items": [
                { "id": format!("sp-{}", query), "name": query,
                  "artists": [{ "name": "Artist" }],
                  "album": { "name": "Album", "images": [{ "url": "cover" }] } }
            ]}}))?)
        }

        async fn search_youtube(&self, query: &str) -> anyhow::Result<YouTubeSearchResponse> {
            Ok(serde_json::from_value(json!({ "items": [
                { "id": { "videoId": format!("yt-{}", query) },
                  "snippet": { "title": query, "channelTitle": "Chan",
                               "thumbnails": { "default": { "url": "thumb" } } } }
            ]}))?)
        }

        async fn youtube_channels(&self, channel_ids: &[String]) -> anyhow::Result<YouTubeChannelResponse> {
            let items: Vec<_> = channel_ids
                .iter()
                .map(|id| json!({ "id": id, "snippet": { "title": "Chan" } }))
                .collect();
            Ok(serde_json::from_value(json!({ "items": items }))?)
        }
    }

    fn service(client: FakeClient) -> SearchService {
        SearchService::new(Arc::new(client), 20)
    }

    #[tokio::test]
    async fn test_search_normalizes_and_records() {
        let svc = service(FakeClient::default());
        let scope = SearchScope::new();

        let outcome = svc.search(&scope, "  Hello ").await.unwrap();
        assert_eq!(outcome.query, "Hello");
        assert_eq!(outcome.spotify[0].id, "sp-Hello");
        assert_eq!(outcome.youtube[0].thumbnail_url, "thumb");
        assert!(outcome.failures.is_empty());

        let songs = outcome.songs();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].album_cover, "cover");
        assert_eq!(songs[1].artist, "Chan");

        let history = svc.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "Hello");
    }

    #[tokio::test]
    async fn test_closed_scope_drops_result() {
        let svc = service(FakeClient { hang: true, ..Default::default() });
        let scope = SearchScope::new();

        let (outcome, _) = tokio::join!(svc.search(&scope, "late"), async {
            tokio::task::yield_now().await;
            scope.close();
        });
        assert!(outcome.is_none());
        assert!(svc.search(&scope, "after close").await.is_none());
    }

    #[tokio::test]
    async fn test_failed_provider_keeps_other_results() {
        let svc = service(FakeClient { spotify_down: true, ..Default::default() });
        let scope = SearchScope::new();

        let outcome = svc.search(&scope, "q").await.unwrap();
        assert!(outcome.spotify.is_empty());
        assert_eq!(outcome.youtube.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].provider, Provider::Spotify);
        assert!(outcome.failures[0].message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_concurrent_searches_latest_ticket_wins() {
        let svc = service(FakeClient::default());
        let scope = SearchScope::new();

        let (a, b) = tokio::join!(svc.search(&scope, "first"), svc.search(&scope, "second"));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.spotify[0].title, "first");
        assert_eq!(b.spotify[0].title, "second");
        let latest = if a.ticket > b.ticket { &a } else { &b };
        assert!(scope.is_current(latest.ticket));
        assert_eq!(svc.history().await.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_query_is_not_searched() {
        let svc = service(FakeClient::default());
        assert!(svc.search(&SearchScope::new(), "   ").await.is_none());
        assert!(svc.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_channel_details() {
        let svc = service(FakeClient::default());
        let scope = SearchScope::new();
        let ids = vec!["UC1".to_string(), "UC2".to_string()];

        let channels = svc.channel_details(&scope, &ids).await.unwrap().unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].id, "UC2");

        scope.close();
        assert!(svc.channel_details(&scope, &ids).await.unwrap().is_none());
    }

    #[test]
    fn test_scope_tickets() {
        let scope = SearchScope::new();
        let t1 = scope.issue();
        let t2 = scope.issue();
        assert!(!scope.is_current(t1));
        assert!(scope.is_current(t2));
        scope.close();
        assert!(!scope.is_current(t2));
    }
}
