// src/ports.rs
//
// Contracts for the two outbound collaborators: the text-generation provider
// behind teaching notes and the identity provider behind leaderboard profiles.
// Handlers only see these traits, so tests can swap in in-process fakes.

use async_trait::async_trait;

/// Errors raised by outbound providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request to provider failed: {0}")]
    Transport(String),
    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Display fields pulled from the identity provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one prompt and returns the raw completion text.
    async fn generate(&self, prompt: &str) -> ProviderResult<String>;
}

#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Looks up the profile for an opaque user id.
    async fn fetch_profile(&self, user_id: &str) -> ProviderResult<UserProfile>;
}
