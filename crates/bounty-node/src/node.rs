use crate::config::NodeConfig;
use crate::metrics::Metrics;
use crate::self_check::SelfCheckOrchestrator;
use anyhow::Result;
use bounty_crypto::{AttestationSigner, ProfileDomain};
use bounty_review::{
    AiAdjudicator, AiReviewService, AiReviewer, ContentCollector, ExplorerClient, GeminiClient,
    GithubClient,
};
use bounty_social::{DiscordClient, GithubAccountClient, SocialVerifier, TwitterClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared services behind the HTTP API. Cheap to clone.
#[derive(Clone)]
pub struct BountyNode {
    pub signer: Arc<AttestationSigner>,
    pub verifier: Arc<SocialVerifier>,
    pub reviewer: Arc<dyn AiReviewer>,
    pub profile_domain: Option<ProfileDomain>,
    pub metrics: Metrics,
    self_check: Arc<SelfCheckOrchestrator>,
}

impl BountyNode {
    /// Build the node with live platform clients from a validated config.
    pub fn new(config: &NodeConfig) -> Result<Self> {
        info!("Initializing bounty node");

        let signer = config.attestation_signer()?;
        let cipher = config.token_cipher()?;
        let profile_domain = config.profile_domain()?;
        let timeout = Duration::from_secs(config.api.request_timeout_secs);

        let verifier = SocialVerifier::new(
            cipher,
            Arc::new(TwitterClient::with_timeout(&config.social.twitter_api_url, timeout)?),
            Arc::new(DiscordClient::with_timeout(&config.social.discord_api_url, timeout)?),
            Arc::new(GithubAccountClient::with_timeout(&config.social.github_api_url, timeout)?),
        );

        let collector = ContentCollector::new(
            Arc::new(GithubClient::new(
                &config.github.api_url,
                config.github.token.clone(),
                timeout,
            )?),
            Arc::new(ExplorerClient::new(config.explorers.clone(), timeout)?),
        );
        let model = GeminiClient::new(
            &config.ai.api_url,
            &config.ai.api_key,
            Duration::from_secs(config.ai.timeout_secs),
        )?;
        let reviewer = AiReviewService::new(collector, AiAdjudicator::new(Arc::new(model)));

        info!(
            signer = %signer.address(),
            scheme = ?signer.scheme(),
            profile_signing = profile_domain.is_some(),
            "Attestation signer loaded"
        );

        Ok(Self::from_parts(
            signer,
            verifier,
            Arc::new(reviewer),
            profile_domain,
            Metrics::new()?,
        ))
    }

    /// Assemble a node from prebuilt services.
    pub fn from_parts(
        signer: AttestationSigner,
        verifier: SocialVerifier,
        reviewer: Arc<dyn AiReviewer>,
        profile_domain: Option<ProfileDomain>,
        metrics: Metrics,
    ) -> Self {
        let signer = Arc::new(signer);
        let verifier = Arc::new(verifier);
        let self_check = SelfCheckOrchestrator::new(
            signer.clone(),
            verifier.clone(),
            reviewer.clone(),
            metrics.clone(),
        );

        Self {
            signer,
            verifier,
            reviewer,
            profile_domain,
            metrics,
            self_check: Arc::new(self_check),
        }
    }

    pub fn self_check(&self) -> &SelfCheckOrchestrator {
        &self.self_check
    }
}
