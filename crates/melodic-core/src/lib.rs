//! Persisted client state and provider search normalization for Melodic.

pub mod auth;
pub mod config;
pub mod history;
pub mod model;
pub mod normalize;
pub mod onboarding;
pub mod platform;
pub mod providers;
pub mod search;
pub mod store;

pub use auth::AuthStore;
pub use onboarding::OnboardingStore;
pub use store::{FileStorage, MemoryStorage, PersistedStore, Storage, StoreError};
