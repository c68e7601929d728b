#![allow(dead_code)]

use melodic_core::model::{AuthProvider, User};
use serde_json::{json, Value};

pub fn sample_user() -> User {
    User {
        id: "kakao-1029384756".to_string(),
        email: Some("learner@example.com".to_string()),
        name: "Learner".to_string(),
        provider: AuthProvider::Kakao,
        profile_image: Some("https://k.kakaocdn.net/profile.jpg".to_string()),
    }
}

/// Two tracks: one complete, one with `preview_url: null` and no album art.
pub fn spotify_two_tracks() -> Value {
    json!({
        "tracks": {
            "href": "https://api.spotify.com/v1/search?query=spring&type=track",
            "items": [
                {
                    "id": "3n3Ppam7vgaVa1iaRUc9Lp",
                    "name": "Spring Day",
                    "artists": [
                        { "id": "3Nrfpe0tUJi4K4DXYWgMUX", "name": "BTS" }
                    ],
                    "album": {
                        "id": "1u9cplh8DXFfCGhL3B0sJg",
                        "name": "You Never Walk Alone",
                        "images": [
                            { "url": "https://i.scdn.co/image/640", "width": 640, "height": 640 },
                            { "url": "https://i.scdn.co/image/300", "width": 300, "height": 300 },
                            { "url": "https://i.scdn.co/image/64", "width": 64, "height": 64 }
                        ]
                    },
                    "preview_url": "https://p.scdn.co/mp3-preview/abc",
                    "duration_ms": 274080
                },
                {
                    "id": "0VjIjW4GlUZAMYd2vXMi3b",
                    "name": "Spring Love",
                    "artists": [
                        { "id": "a1", "name": "Eric Nam" },
                        { "id": "a2", "name": "Wendy" }
                    ],
                    "album": { "id": "b1", "name": "Spring Love", "images": [] },
                    "preview_url": null
                }
            ],
            "limit": 20,
            "offset": 0,
            "total": 2
        }
    })
}

pub fn youtube_search() -> Value {
    json!({
        "kind": "youtube#searchListResponse",
        "nextPageToken": "CAUQAA",
        "items": [
            {
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#video", "videoId": "xEeFrLSkMm8" },
                "snippet": {
                    "publishedAt": "2017-02-12T15:00:00Z",
                    "channelId": "UC3IZKseVpdzPSBaWxBxundA",
                    "title": "BTS (방탄소년단) '봄날 (Spring Day)' Official MV",
                    "channelTitle": "HYBE LABELS",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/xEeFrLSkMm8/default.jpg", "width": 120, "height": 90 },
                        "medium": { "url": "https://i.ytimg.com/vi/xEeFrLSkMm8/mqdefault.jpg", "width": 320, "height": 180 },
                        "high": { "url": "https://i.ytimg.com/vi/xEeFrLSkMm8/hqdefault.jpg", "width": 480, "height": 360 }
                    }
                }
            },
            {
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#video", "videoId": "lyric01" },
                "snippet": {
                    "title": "Spring Day (lyrics)",
                    "channelTitle": "Lyrics Channel",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/lyric01/default.jpg" }
                    }
                }
            }
        ]
    })
}
