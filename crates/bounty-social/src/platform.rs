use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "twitter")]
    X,
    Discord,
    Github,
}

impl Platform {
    /// Account label as shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::X => "X",
            Platform::Discord => "Discord",
            Platform::Github => "GitHub",
        }
    }

    /// Name of the upstream service, used in failure messages.
    pub fn service(&self) -> &'static str {
        match self {
            Platform::X => "Twitter",
            Platform::Discord => "Discord",
            Platform::Github => "GitHub",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The account behind an access token, as reported live by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: String,
    pub username: String,
}

/// Public engagement counters of a tweet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
}
