//! Domain model shared by the stores, the normalizer and the UI.
//!
//! Every shape serializes with camelCase field names; `None` optionals are
//! omitted from the output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Identity ──────────────────────────────────────────────────────────────────

/// Identity issuer a user signed in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Kakao,
    Naver,
    Google,
    Email,
}

impl AuthProvider {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kakao  => "kakao",
            Self::Naver  => "naver",
            Self::Google => "google",
            Self::Email  => "email",
        }
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AuthProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kakao"  => Ok(Self::Kakao),
            "naver"  => Ok(Self::Naver),
            "google" => Ok(Self::Google),
            "email"  => Ok(Self::Email),
            other    => anyhow::bail!("unknown auth provider: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub name: String,
    pub provider: AuthProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, provider: AuthProvider) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: name.into(),
            provider,
            profile_image: None,
        }
    }

    /// Only the id carries identity; a blank id cannot start a session.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Singleton session. `is_authenticated` is true exactly when `user` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl AuthState {
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingState {
    #[serde(default)]
    pub has_seen_tutorial: bool,
}

// ── Tracks ────────────────────────────────────────────────────────────────────

/// Canonical, provider-agnostic track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album_cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl Song {
    pub fn mark_learned(&mut self, date: NaiveDate) {
        self.learned_date = Some(date);
    }

    pub fn is_learned(&self) -> bool {
        self.learned_date.is_some()
    }

    /// Flip the favorite flag; an unset flag counts as not favorite.
    pub fn toggle_favorite(&mut self) -> bool {
        let next = !self.is_favorite.unwrap_or(false);
        self.is_favorite = Some(next);
        next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifySearchResult {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album_name: String,
    /// Empty string when the album has no images.
    pub album_image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSearchResult {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    /// Empty string when the item has no thumbnails.
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeChannel {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<u64>,
}

// ── Search history ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistory {
    pub id: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
}
