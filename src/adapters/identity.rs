//! src/adapters/identity.rs
//!
//! `ProfileProvider` backed by the identity provider's user REST endpoint
//! (`GET {base}/users/{id}` with a bearer secret).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{ProfileProvider, ProviderError, ProviderResult, UserProfile};

#[derive(Clone)]
pub struct HttpProfileProvider {
    client: reqwest::Client,
    base_url: String,
    secret: String,
}

/// Subset of the provider's user object that we display.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
    image_url: Option<String>,
}

impl From<ProviderUser> for UserProfile {
    fn from(user: ProviderUser) -> Self {
        let full_name = [user.first_name, user.last_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let display_name = if full_name.is_empty() {
            user.username.filter(|u| !u.trim().is_empty())
        } else {
            Some(full_name)
        };

        UserProfile {
            display_name,
            avatar_url: user.image_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl HttpProfileProvider {
    pub fn new(base_url: &str, secret: String, timeout: Duration) -> ProviderResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret,
        })
    }
}

#[async_trait]
impl ProfileProvider for HttpProfileProvider {
    async fn fetch_profile(&self, user_id: &str) -> ProviderResult<UserProfile> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Transport("identity URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["users", user_id]);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(user_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(user.into())
    }
}
