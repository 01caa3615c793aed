use crate::error::Result;
use crate::http::{build_client, send_json, DEFAULT_TIMEOUT_SECS};
use crate::platform::{Platform, PlatformUser};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api";

#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Ids of the guilds the token's user belongs to.
    async fn guild_ids(&self, token: &str) -> Result<Vec<String>>;

    async fn current_user(&self, token: &str) -> Result<PlatformUser>;
}

#[derive(Deserialize)]
struct Guild {
    id: String,
}

#[derive(Deserialize)]
struct User {
    id: String,
    username: String,
}

pub struct DiscordClient {
    client: Client,
    base_url: String,
}

impl DiscordClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(Platform::Discord, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    async fn guild_ids(&self, token: &str) -> Result<Vec<String>> {
        let request = self
            .client
            .get(format!("{}/users/@me/guilds", self.base_url))
            .bearer_auth(token);

        let guilds: Vec<Guild> = send_json(Platform::Discord, request).await?;
        Ok(guilds.into_iter().map(|guild| guild.id).collect())
    }

    async fn current_user(&self, token: &str) -> Result<PlatformUser> {
        let request = self
            .client
            .get(format!("{}/users/@me", self.base_url))
            .bearer_auth(token);

        let user: User = send_json(Platform::Discord, request).await?;
        Ok(PlatformUser {
            id: user.id,
            username: user.username,
        })
    }
}
