use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::model::{AuthState, User};
use crate::store::{PersistedState, PersistedStore, Storage, StoreError};

pub const AUTH_STORE_KEY: &str = "melodic-auth";

impl PersistedState for AuthState {
    const KEY: &'static str = AUTH_STORE_KEY;

    fn is_consistent(&self) -> bool {
        self.is_authenticated == self.user.is_some()
    }
}

/// Session store. `login` and `logout` replace both fields in one mutation.
pub struct AuthStore {
    inner: PersistedStore<AuthState>,
}

impl AuthStore {
    pub async fn open(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: PersistedStore::open(storage).await,
        }
    }

    pub fn get_state(&self) -> AuthState {
        self.inner.get_state()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.get_state().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.get_state().is_authenticated
    }

    /// Logging in again as the same user is a no-op; a different user
    /// replaces the current session.
    pub async fn login(&self, user: User) -> Result<AuthState, StoreError> {
        if !user.is_valid() {
            return Err(StoreError::InvalidUser("user id is empty".to_string()));
        }
        info!("[auth] login id={} provider={}", user.id, user.provider);
        self.inner
            .mutate("login", move |s| *s = AuthState::signed_in(user))
            .await
    }

    /// No-op when already logged out.
    pub async fn logout(&self) -> Result<AuthState, StoreError> {
        if self.is_authenticated() {
            info!("[auth] logout");
        }
        self.inner
            .mutate("logout", |s| *s = AuthState::default())
            .await
    }
}
