pub mod discord;
pub mod error;
pub mod github;
mod http;
pub mod platform;
pub mod twitter;
pub mod verifier;

pub use discord::{DiscordApi, DiscordClient, DEFAULT_DISCORD_API_URL};
pub use error::{Result, VerificationError};
pub use github::{GithubAccountApi, GithubAccountClient, DEFAULT_GITHUB_API_URL};
pub use platform::{Platform, PlatformUser, TweetMetrics};
pub use twitter::{TwitterApi, TwitterClient, DEFAULT_TWITTER_API_URL};
pub use verifier::{AccountVerification, SocialVerifier};
