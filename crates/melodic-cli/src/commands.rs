use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use melodic_core::model::User;
use melodic_core::normalize::{
    normalize_spotify, normalize_youtube, normalize_youtube_channels, parse_spotify,
    parse_youtube, parse_youtube_channels, songs_from_spotify, songs_from_youtube,
};
use melodic_core::{AuthStore, OnboardingStore, Storage};
use serde::Serialize;
use tracing::{info, warn};

use crate::{PayloadKind, TutorialAction};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    auth: melodic_core::model::AuthState,
    onboarding: melodic_core::model::OnboardingState,
}

pub async fn status(storage: Arc<dyn Storage>) -> anyhow::Result<()> {
    let auth = AuthStore::open(storage.clone()).await;
    let onboarding = OnboardingStore::open(storage).await;
    print_json(&Status {
        auth: auth.get_state(),
        onboarding: onboarding.get_state(),
    })
}

pub async fn login(storage: Arc<dyn Storage>, user: User) -> anyhow::Result<()> {
    let auth = AuthStore::open(storage).await;
    let state = auth.login(user).await?;
    print_json(&state)
}

pub async fn logout(storage: Arc<dyn Storage>) -> anyhow::Result<()> {
    let auth = AuthStore::open(storage).await;
    let state = auth.logout().await?;
    print_json(&state)
}

pub async fn tutorial(storage: Arc<dyn Storage>, action: TutorialAction) -> anyhow::Result<()> {
    let onboarding = OnboardingStore::open(storage).await;
    let state = match action {
        TutorialAction::Seen => onboarding.set_has_seen_tutorial(true).await?,
        TutorialAction::Reset => onboarding.reset().await?,
    };
    print_json(&state)
}

pub fn normalize(kind: PayloadKind, path: &Path, songs: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    info!("normalizing {:?} payload from {}", kind, path.display());

    match kind {
        PayloadKind::Spotify => {
            let resp = parse_spotify(&raw)?;
            if songs {
                print_json(&songs_from_spotify(&resp))
            } else {
                print_json(&normalize_spotify(&resp))
            }
        }
        PayloadKind::Youtube => {
            let resp = parse_youtube(&raw)?;
            if songs {
                print_json(&songs_from_youtube(&resp))
            } else {
                print_json(&normalize_youtube(&resp))
            }
        }
        PayloadKind::YoutubeChannel => {
            if songs {
                warn!("--songs has no meaning for channel payloads, ignoring");
            }
            let resp = parse_youtube_channels(&raw)?;
            print_json(&normalize_youtube_channels(&resp))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
