//! X (Twitter) API v2 access with a user OAuth bearer token.

use crate::error::Result;
use crate::http::{build_client, send_json, DEFAULT_TIMEOUT_SECS};
use crate::platform::{Platform, PlatformUser, TweetMetrics};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com/2";

/// Following lists are paged 1000 at a time; stop after this many pages.
const MAX_FOLLOWING_PAGES: usize = 5;

#[async_trait]
pub trait TwitterApi: Send + Sync {
    /// Usernames the user follows.
    async fn following_usernames(&self, token: &str, user_id: &str) -> Result<Vec<String>>;

    async fn tweet_metrics(&self, token: &str, tweet_id: &str) -> Result<TweetMetrics>;

    async fn current_user(&self, token: &str) -> Result<PlatformUser>;
}

#[derive(Deserialize)]
struct UserData {
    id: String,
    username: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct FollowingPage {
    #[serde(default)]
    data: Vec<UserData>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Deserialize)]
struct PageMeta {
    next_token: Option<String>,
}

#[derive(Deserialize)]
struct TweetData {
    #[serde(default)]
    public_metrics: TweetMetrics,
}

pub struct TwitterClient {
    client: Client,
    base_url: String,
}

impl TwitterClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(Platform::X, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TwitterApi for TwitterClient {
    async fn following_usernames(&self, token: &str, user_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/users/{}/following", self.base_url, user_id);
        let mut usernames = Vec::new();
        let mut next_token: Option<String> = None;

        for _ in 0..MAX_FOLLOWING_PAGES {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(token)
                .query(&[("max_results", "1000")]);
            if let Some(ref cursor) = next_token {
                request = request.query(&[("pagination_token", cursor.as_str())]);
            }

            let page: FollowingPage = send_json(Platform::X, request).await?;
            usernames.extend(page.data.into_iter().map(|user| user.username));

            next_token = page.meta.and_then(|meta| meta.next_token);
            if next_token.is_none() {
                break;
            }
        }

        debug!(count = usernames.len(), "Fetched X following list");
        Ok(usernames)
    }

    async fn tweet_metrics(&self, token: &str, tweet_id: &str) -> Result<TweetMetrics> {
        let request = self
            .client
            .get(format!("{}/tweets/{}", self.base_url, tweet_id))
            .bearer_auth(token)
            .query(&[("tweet.fields", "public_metrics")]);

        let tweet: Envelope<TweetData> = send_json(Platform::X, request).await?;
        Ok(tweet.data.public_metrics)
    }

    async fn current_user(&self, token: &str) -> Result<PlatformUser> {
        let request = self
            .client
            .get(format!("{}/users/me", self.base_url))
            .bearer_auth(token);

        let user: Envelope<UserData> = send_json(Platform::X, request).await?;
        Ok(PlatformUser {
            id: user.data.id,
            username: user.data.username,
        })
    }
}
