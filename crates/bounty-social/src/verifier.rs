//! Server-side confirmation of the social actions a task requires.
//!
//! Tokens arrive encrypted inside the submission proof and are decrypted here
//! for the duration of one call. Every check first confirms the token belongs
//! to the account id the submitter claims.

use crate::discord::DiscordApi;
use crate::error::{Result, VerificationError};
use crate::github::GithubAccountApi;
use crate::platform::{Platform, PlatformUser};
use crate::twitter::TwitterApi;
use bounty_crypto::TokenCipher;
use bounty_types::{SocialTokens, SubmissionProof, TaskConfig, XAction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of matching a token against a claimed account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountVerification {
    pub verified: bool,
    pub user_id: String,
    pub username: String,
}

pub struct SocialVerifier {
    cipher: TokenCipher,
    twitter: Arc<dyn TwitterApi>,
    discord: Arc<dyn DiscordApi>,
    github: Arc<dyn GithubAccountApi>,
}

impl SocialVerifier {
    pub fn new(
        cipher: TokenCipher,
        twitter: Arc<dyn TwitterApi>,
        discord: Arc<dyn DiscordApi>,
        github: Arc<dyn GithubAccountApi>,
    ) -> Self {
        Self {
            cipher,
            twitter,
            discord,
            github,
        }
    }

    /// Check every social requirement of `config` against `proof`.
    ///
    /// Returns `Ok(true)` without touching the network when nothing is
    /// required; any unmet requirement is an error.
    pub async fn verify(&self, config: &TaskConfig, proof: &SubmissionProof) -> Result<bool> {
        let requirements = config.social_requirements();
        if requirements.is_empty() {
            return Ok(true);
        }

        if let Some((action, target)) = requirements.x_action {
            let (bundle, user_id) = match (proof.encrypted_tokens(), proof.x_id()) {
                (Some(bundle), Some(user_id)) => (bundle, user_id),
                _ => return Err(VerificationError::MissingCredentials { platform: Platform::X }),
            };

            if !self.twitter_action(bundle, user_id, action, &target).await? {
                return Err(VerificationError::NotSatisfied {
                    platform: Platform::X,
                    reason: format!("{} requirement for {} not met", action, target),
                });
            }
        }

        if let Some(guild_id) = requirements.discord_guild_id {
            let (bundle, user_id) = match (proof.encrypted_tokens(), proof.discord_id()) {
                (Some(bundle), Some(user_id)) => (bundle, user_id),
                _ => {
                    return Err(VerificationError::MissingCredentials {
                        platform: Platform::Discord,
                    })
                }
            };

            if !self.discord_membership(bundle, user_id, &guild_id).await? {
                return Err(VerificationError::NotSatisfied {
                    platform: Platform::Discord,
                    reason: "user is not a member of the required server".to_string(),
                });
            }
        }

        info!("Social requirements satisfied");
        Ok(true)
    }

    /// Whether the X account behind `bundle` performed `action` on `target`.
    ///
    /// Likes and retweets are judged from the tweet's public counters, which
    /// cannot attribute the action to this particular user.
    pub async fn twitter_action(
        &self,
        bundle: &str,
        user_id: &str,
        action: XAction,
        target: &str,
    ) -> Result<bool> {
        let tokens = self.decrypt(bundle)?;
        let token = tokens
            .x()
            .ok_or(VerificationError::MissingCredentials { platform: Platform::X })?;

        let user = self.twitter.current_user(token).await?;
        ensure_account(Platform::X, &user, user_id)?;

        let verified = match action {
            XAction::Follow => {
                let wanted = target.trim_start_matches('@');
                self.twitter
                    .following_usernames(token, user_id)
                    .await?
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(wanted))
            }
            XAction::Like => self.twitter.tweet_metrics(token, target).await?.like_count > 0,
            XAction::Retweet => self.twitter.tweet_metrics(token, target).await?.retweet_count > 0,
        };

        debug!(action = %action, verified, "X action checked");
        Ok(verified)
    }

    /// Whether the Discord account behind `bundle` is in guild `guild_id`.
    pub async fn discord_membership(
        &self,
        bundle: &str,
        user_id: &str,
        guild_id: &str,
    ) -> Result<bool> {
        let tokens = self.decrypt(bundle)?;
        let token = tokens.discord().ok_or(VerificationError::MissingCredentials {
            platform: Platform::Discord,
        })?;

        let user = self.discord.current_user(token).await?;
        ensure_account(Platform::Discord, &user, user_id)?;

        let in_guild = self
            .discord
            .guild_ids(token)
            .await?
            .iter()
            .any(|id| id == guild_id);

        debug!(guild_id, in_guild, "Discord membership checked");
        Ok(in_guild)
    }

    /// Ask the platform who owns the token and compare with `user_id`.
    pub async fn verify_account(
        &self,
        platform: Platform,
        bundle: &str,
        user_id: &str,
    ) -> Result<AccountVerification> {
        let tokens = self.decrypt(bundle)?;
        let missing = VerificationError::MissingCredentials { platform };

        let user = match platform {
            Platform::X => self.twitter.current_user(tokens.x().ok_or(missing)?).await?,
            Platform::Discord => {
                self.discord
                    .current_user(tokens.discord().ok_or(missing)?)
                    .await?
            }
            Platform::Github => {
                self.github
                    .current_user(tokens.github().ok_or(missing)?)
                    .await?
            }
        };

        let verified = user.id == user_id;
        if !verified {
            warn!(platform = %platform, "Account id mismatch");
        }

        Ok(AccountVerification {
            verified,
            user_id: user.id,
            username: user.username,
        })
    }

    fn decrypt(&self, bundle: &str) -> Result<SocialTokens> {
        Ok(self.cipher.decrypt_tokens(bundle)?)
    }
}

fn ensure_account(platform: Platform, user: &PlatformUser, claimed_id: &str) -> Result<()> {
    if user.id == claimed_id {
        Ok(())
    } else {
        Err(VerificationError::AccountMismatch { platform })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::TweetMetrics;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeTwitter {
        following: Vec<String>,
        metrics: TweetMetrics,
        rate_limited: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TwitterApi for FakeTwitter {
        async fn following_usernames(&self, _token: &str, _user_id: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.rate_limited {
                return Err(VerificationError::RateLimited { platform: Platform::X });
            }
            Ok(self.following.clone())
        }

        async fn tweet_metrics(&self, _token: &str, _tweet_id: &str) -> Result<TweetMetrics> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.metrics)
        }

        async fn current_user(&self, token: &str) -> Result<PlatformUser> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(token, "x-token");
            Ok(PlatformUser {
                id: "42".to_string(),
                username: "bob".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct FakeDiscord {
        guilds: Vec<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DiscordApi for FakeDiscord {
        async fn guild_ids(&self, _token: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.guilds.clone())
        }

        async fn current_user(&self, _token: &str) -> Result<PlatformUser> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PlatformUser {
                id: "900".to_string(),
                username: "bob#1".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct FakeGithub {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GithubAccountApi for FakeGithub {
        async fn current_user(&self, _token: &str) -> Result<PlatformUser> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PlatformUser {
                id: "7".to_string(),
                username: "bob-gh".to_string(),
            })
        }
    }

    fn cipher() -> TokenCipher {
        TokenCipher::new(&[3u8; 32])
    }

    fn bundle() -> String {
        cipher()
            .encrypt_tokens(&SocialTokens {
                x_access_token: Some("x-token".to_string()),
                discord_access_token: Some("d-token".to_string()),
                github_access_token: Some("g-token".to_string()),
            })
            .unwrap()
    }

    fn verifier(
        twitter: Arc<FakeTwitter>,
        discord: Arc<FakeDiscord>,
        github: Arc<FakeGithub>,
    ) -> SocialVerifier {
        SocialVerifier::new(cipher(), twitter, discord, github)
    }

    fn x_proof() -> SubmissionProof {
        SubmissionProof {
            x_id: Some("42".to_string()),
            encrypted_tokens: Some(bundle()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_requirements_makes_no_calls() {
        let twitter = Arc::new(FakeTwitter::default());
        let discord = Arc::new(FakeDiscord::default());
        let github = Arc::new(FakeGithub::default());
        let verifier = verifier(twitter.clone(), discord.clone(), github.clone());

        let config = TaskConfig::from_json(r#"{"taskType":["Plain Text"]}"#).unwrap();
        assert!(verifier
            .verify(&config, &SubmissionProof::default())
            .await
            .unwrap());

        assert_eq!(twitter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(discord.calls.load(Ordering::SeqCst), 0);
        assert_eq!(github.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_follow_is_case_insensitive() {
        let twitter = Arc::new(FakeTwitter {
            following: vec!["carol".to_string(), "Alice".to_string()],
            ..Default::default()
        });
        let verifier = verifier(twitter, Default::default(), Default::default());

        let config = TaskConfig {
            x_follow_username: Some("@alice".to_string()),
            ..Default::default()
        };
        assert!(verifier.verify(&config, &x_proof()).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_missing_target_fails() {
        let twitter = Arc::new(FakeTwitter {
            following: vec!["carol".to_string()],
            ..Default::default()
        });
        let verifier = verifier(twitter, Default::default(), Default::default());

        let config = TaskConfig {
            x_follow_username: Some("alice".to_string()),
            ..Default::default()
        };
        let err = verifier.verify(&config, &x_proof()).await.unwrap_err();
        assert!(matches!(err, VerificationError::NotSatisfied { .. }));
        assert!(err.to_string().starts_with("Twitter verification failed"));
    }

    #[tokio::test]
    async fn test_like_uses_public_count() {
        let twitter = Arc::new(FakeTwitter {
            metrics: TweetMetrics {
                like_count: 3,
                retweet_count: 0,
            },
            ..Default::default()
        });
        let verifier = verifier(twitter, Default::default(), Default::default());

        let like = TaskConfig {
            x_like_id: Some("1001".to_string()),
            ..Default::default()
        };
        assert!(verifier.verify(&like, &x_proof()).await.unwrap());

        let retweet = TaskConfig {
            x_retweet_id: Some("1001".to_string()),
            ..Default::default()
        };
        assert!(verifier.verify(&retweet, &x_proof()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_x_credentials() {
        let twitter = Arc::new(FakeTwitter::default());
        let verifier = verifier(twitter.clone(), Default::default(), Default::default());
        let config = TaskConfig {
            x_follow_username: Some("alice".to_string()),
            ..Default::default()
        };
        let proof = SubmissionProof {
            x_id: Some("42".to_string()),
            ..Default::default()
        };

        let err = verifier.verify(&config, &proof).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing X account information");
        assert_eq!(twitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_discord_credentials() {
        let discord = Arc::new(FakeDiscord::default());
        let verifier = verifier(Default::default(), discord.clone(), Default::default());
        let config = TaskConfig {
            discord_channel_id: Some("555".to_string()),
            ..Default::default()
        };

        let err = verifier
            .verify(&config, &SubmissionProof::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing Discord account information");
        assert!(err.is_client_fault());
        assert_eq!(discord.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_discord_guild_membership() {
        let discord = Arc::new(FakeDiscord {
            guilds: vec!["111".to_string(), "555".to_string()],
            ..Default::default()
        });
        let verifier = verifier(Default::default(), discord, Default::default());
        let proof = SubmissionProof {
            discord_id: Some("900".to_string()),
            encrypted_tokens: Some(bundle()),
            ..Default::default()
        };

        let member = TaskConfig {
            discord_channel_id: Some("555".to_string()),
            ..Default::default()
        };
        assert!(verifier.verify(&member, &proof).await.unwrap());

        let outsider = TaskConfig {
            discord_channel_id: Some("999".to_string()),
            ..Default::default()
        };
        let err = verifier.verify(&outsider, &proof).await.unwrap_err();
        assert!(err.to_string().starts_with("Discord verification failed"));
    }

    #[tokio::test]
    async fn test_claimed_id_must_match_token_owner() {
        let verifier = verifier(Default::default(), Default::default(), Default::default());
        let config = TaskConfig {
            x_follow_username: Some("alice".to_string()),
            ..Default::default()
        };
        let proof = SubmissionProof {
            x_id: Some("43".to_string()),
            encrypted_tokens: Some(bundle()),
            ..Default::default()
        };

        assert!(matches!(
            verifier.verify(&config, &proof).await,
            Err(VerificationError::AccountMismatch { platform: Platform::X })
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces() {
        let twitter = Arc::new(FakeTwitter {
            rate_limited: true,
            ..Default::default()
        });
        let verifier = verifier(twitter, Default::default(), Default::default());
        let config = TaskConfig {
            x_follow_username: Some("alice".to_string()),
            ..Default::default()
        };

        let err = verifier.verify(&config, &x_proof()).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert!(!err.is_client_fault());
    }

    #[tokio::test]
    async fn test_undecryptable_bundle() {
        let verifier = verifier(Default::default(), Default::default(), Default::default());
        let config = TaskConfig {
            x_follow_username: Some("alice".to_string()),
            ..Default::default()
        };
        let proof = SubmissionProof {
            x_id: Some("42".to_string()),
            encrypted_tokens: Some("bm90IGEgYnVuZGxl".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            verifier.verify(&config, &proof).await,
            Err(VerificationError::Decryption(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_account() {
        let github = Arc::new(FakeGithub::default());
        let verifier = verifier(Default::default(), Default::default(), github.clone());

        let ok = verifier
            .verify_account(Platform::Github, &bundle(), "7")
            .await
            .unwrap();
        assert!(ok.verified);
        assert_eq!(ok.username, "bob-gh");

        let other = verifier
            .verify_account(Platform::Github, &bundle(), "8")
            .await
            .unwrap();
        assert!(!other.verified);
        assert_eq!(github.calls.load(Ordering::SeqCst), 2);
    }
}
