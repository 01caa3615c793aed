use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform access tokens as the client encrypts them into `encryptedTokens`.
///
/// Only ever held in memory for the duration of one verification call.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialTokens {
    pub x_access_token: Option<String>,
    pub discord_access_token: Option<String>,
    pub github_access_token: Option<String>,
}

impl SocialTokens {
    pub fn x(&self) -> Option<&str> {
        self.x_access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn discord(&self) -> Option<&str> {
        self.discord_access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn github(&self) -> Option<&str> {
        self.github_access_token.as_deref().filter(|t| !t.is_empty())
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for SocialTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocialTokens")
            .field("x", &self.x().is_some())
            .field("discord", &self.discord().is_some())
            .field("github", &self.github().is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XAction {
    Follow,
    Like,
    Retweet,
}

impl XAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            XAction::Follow => "follow",
            XAction::Like => "like",
            XAction::Retweet => "retweet",
        }
    }
}

impl fmt::Display for XAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
