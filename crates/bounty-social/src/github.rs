use crate::error::Result;
use crate::http::{build_client, send_json, DEFAULT_TIMEOUT_SECS};
use crate::platform::{Platform, PlatformUser};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[async_trait]
pub trait GithubAccountApi: Send + Sync {
    async fn current_user(&self, token: &str) -> Result<PlatformUser>;
}

#[derive(Deserialize)]
struct User {
    id: u64,
    login: String,
}

pub struct GithubAccountClient {
    client: Client,
    base_url: String,
}

impl GithubAccountClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(Platform::Github, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GithubAccountApi for GithubAccountClient {
    async fn current_user(&self, token: &str) -> Result<PlatformUser> {
        let request = self
            .client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github.v3+json");

        let user: User = send_json(Platform::Github, request).await?;
        Ok(PlatformUser {
            id: user.id.to_string(),
            username: user.login,
        })
    }
}
