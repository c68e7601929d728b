use std::sync::Arc;

use tokio::sync::watch;

use crate::model::OnboardingState;
use crate::store::{PersistedState, PersistedStore, Storage, StoreError};

pub const ONBOARDING_STORE_KEY: &str = "melodic-onboarding";

impl PersistedState for OnboardingState {
    const KEY: &'static str = ONBOARDING_STORE_KEY;
}

pub struct OnboardingStore {
    inner: PersistedStore<OnboardingState>,
}

impl OnboardingStore {
    pub async fn open(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: PersistedStore::open(storage).await,
        }
    }

    pub fn get_state(&self) -> OnboardingState {
        self.inner.get_state()
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingState> {
        self.inner.subscribe()
    }

    pub fn has_seen_tutorial(&self) -> bool {
        self.inner.get_state().has_seen_tutorial
    }

    pub async fn set_has_seen_tutorial(&self, seen: bool) -> Result<OnboardingState, StoreError> {
        self.inner
            .mutate("setHasSeenTutorial", move |s| s.has_seen_tutorial = seen)
            .await
    }

    /// Show the tutorial again on next launch.
    pub async fn reset(&self) -> Result<OnboardingState, StoreError> {
        self.inner.reset().await
    }
}
