use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bounty_crypto::{
    attestation_hash, recover_signer, Address, AttestationSigner, ProfileDomain, SigningScheme,
    TokenCipher, UserProfileClaim, U256,
};
use bounty_node::{build_router, BountyNode, Metrics};
use bounty_review::{AiReviewRequest, AiReviewer};
use bounty_social::{
    DiscordApi, GithubAccountApi, Platform, PlatformUser, SocialVerifier, TweetMetrics, TwitterApi,
    VerificationError,
};
use bounty_types::{ReviewOutcome, SocialTokens};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const SUBMITTER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const PORTAL: &str = "0x6e34fa9fd5926137109Ec7D6ad94d860148c2f75";
const CIPHER_KEY: [u8; 32] = [9u8; 32];

#[derive(Default)]
struct FakeTwitter {
    following: Vec<String>,
    rate_limited: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl TwitterApi for FakeTwitter {
    async fn following_usernames(
        &self,
        _token: &str,
        _user_id: &str,
    ) -> bounty_social::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rate_limited {
            return Err(VerificationError::RateLimited {
                platform: Platform::X,
            });
        }
        Ok(self.following.clone())
    }

    async fn tweet_metrics(&self, _token: &str, _tweet_id: &str) -> bounty_social::Result<TweetMetrics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TweetMetrics {
            like_count: 3,
            retweet_count: 0,
        })
    }

    async fn current_user(&self, _token: &str) -> bounty_social::Result<PlatformUser> {
        self.calls.fetch_add(1, Ordering::SeqCst);
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
    async fn guild_ids(&self, _token: &str) -> bounty_social::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.guilds.clone())
    }

    async fn current_user(&self, _token: &str) -> bounty_social::Result<PlatformUser> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PlatformUser {
            id: "900".to_string(),
            username: "bob#0001".to_string(),
        })
    }
}

struct FakeGithub;

#[async_trait]
impl GithubAccountApi for FakeGithub {
    async fn current_user(&self, _token: &str) -> bounty_social::Result<PlatformUser> {
        Ok(PlatformUser {
            id: "7".to_string(),
            username: "bob-gh".to_string(),
        })
    }
}

struct FakeReviewer {
    outcome: ReviewOutcome,
    calls: AtomicUsize,
}

#[async_trait]
impl AiReviewer for FakeReviewer {
    async fn review(&self, _request: &AiReviewRequest) -> bounty_review::Result<ReviewOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}

struct Harness {
    app: Router,
    twitter: Arc<FakeTwitter>,
    reviewer: Arc<FakeReviewer>,
    signer: Address,
}

fn harness(twitter: FakeTwitter, discord: FakeDiscord, outcome: ReviewOutcome) -> Harness {
    let twitter = Arc::new(twitter);
    let reviewer = Arc::new(FakeReviewer {
        outcome,
        calls: AtomicUsize::new(0),
    });
    let signer = AttestationSigner::from_hex(DEV_KEY, SigningScheme::Eip191).unwrap();
    let signer_address = signer.address();

    let verifier = SocialVerifier::new(
        TokenCipher::new(&CIPHER_KEY),
        twitter.clone(),
        Arc::new(discord),
        Arc::new(FakeGithub),
    );
    let domain = ProfileDomain {
        chain_id: 59141,
        verifying_contract: PORTAL.parse().unwrap(),
    };
    let node = BountyNode::from_parts(
        signer,
        verifier,
        reviewer.clone(),
        Some(domain),
        Metrics::new().unwrap(),
    );

    Harness {
        app: build_router(node),
        twitter,
        reviewer,
        signer: signer_address,
    }
}

fn default_harness() -> Harness {
    harness(
        FakeTwitter::default(),
        FakeDiscord::default(),
        ReviewOutcome::new(true, "Looks complete"),
    )
}

fn token_bundle() -> String {
    TokenCipher::new(&CIPHER_KEY)
        .encrypt_tokens(&SocialTokens {
            x_access_token: Some("x-token".to_string()),
            discord_access_token: Some("d-token".to_string()),
            github_access_token: Some("g-token".to_string()),
        })
        .unwrap()
}

fn self_check_body(config: Value, allow_self_check: bool, proof: Value) -> Value {
    json!({
        "boardId": 1,
        "taskId": "2",
        "address": SUBMITTER,
        "proof": proof.to_string(),
        "chainName": "Anvil",
        "boardConfig": {},
        "task": {
            "name": "Essay",
            "description": "Write a short essay",
            "config": config.to_string(),
            "allowSelfCheck": allow_self_check
        }
    })
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn error_of(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_health() {
    let h = default_harness();
    let (status, text) = get_text(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "OK");
}

#[tokio::test]
async fn test_self_check_refused_when_task_disallows_it() {
    let h = default_harness();
    let body = self_check_body(json!({"taskType": ["Plain Text"]}), false, json!({"text": "done"}));

    let (status, body) = post_json(&h.app, "/api/self-check", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Task does not allow self-check");
    assert!(body.get("signature").is_none());
}

#[tokio::test]
async fn test_plain_text_self_check_signs_success() {
    let h = default_harness();
    let body = self_check_body(json!({"taskType": ["Plain Text"]}), true, json!({"text": "done"}));

    let (status, body) = post_json(&h.app, "/api/self-check", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checkData"], "Check Success");

    let hash = attestation_hash(
        U256::from(1u64),
        U256::from(2u64),
        SUBMITTER.parse().unwrap(),
        "Check Success",
    );
    let recovered =
        recover_signer(&hash, body["signature"].as_str().unwrap(), SigningScheme::Eip191).unwrap();
    assert_eq!(recovered, h.signer);
    assert_eq!(h.reviewer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ai_rejection_surfaces_comment() {
    let h = harness(
        FakeTwitter::default(),
        FakeDiscord::default(),
        ReviewOutcome::new(false, "Missing required detail"),
    );
    let config = json!({
        "taskType": ["Plain Text"],
        "aiReview": true,
        "aiReviewPrompt": "Check every detail"
    });
    let body = self_check_body(config, true, json!({"text": "done"}));

    let (status, body) = post_json(&h.app, "/api/self-check", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Missing required detail");
    assert!(body.get("signature").is_none());
    assert_eq!(h.reviewer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ai_approval_comment_becomes_check_data() {
    let h = default_harness();
    let config = json!({
        "taskType": ["Plain Text"],
        "aiReview": true,
        "aiReviewPrompt": "Check every detail"
    });
    let body = self_check_body(config, true, json!({"text": "done"}));

    let (status, body) = post_json(&h.app, "/api/self-check", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checkData"], "Looks complete");
}

#[tokio::test]
async fn test_missing_follow_fails_twitter_verification() {
    let h = harness(
        FakeTwitter {
            following: vec!["carol".to_string()],
            ..Default::default()
        },
        FakeDiscord::default(),
        ReviewOutcome::new(true, "ok"),
    );
    let config = json!({"taskType": ["X Follow"], "XFollowUsername": "alice"});
    let proof = json!({"xId": "42", "encryptedTokens": token_bundle()});

    let (status, body) = post_json(&h.app, "/api/self-check", self_check_body(config, true, proof)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        error_of(&body).starts_with("Twitter verification failed"),
        "{}",
        error_of(&body)
    );
    assert!(h.twitter.calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn test_follow_satisfied_case_insensitively() {
    let h = harness(
        FakeTwitter {
            following: vec!["Alice".to_string()],
            ..Default::default()
        },
        FakeDiscord::default(),
        ReviewOutcome::new(true, "ok"),
    );
    let config = json!({"taskType": ["X Follow"], "XFollowUsername": "@alice"});
    let proof = json!({"xId": "42", "encryptedTokens": token_bundle()});

    let (status, body) = post_json(&h.app, "/api/self-check", self_check_body(config, true, proof)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checkData"], "Check Success");
}

#[tokio::test]
async fn test_discord_task_without_tokens_stops_before_review() {
    let h = default_harness();
    let config = json!({
        "taskType": ["Join Discord", "Plain Text"],
        "DiscordChannelId": "1234",
        "aiReview": true,
        "aiReviewPrompt": "Check it"
    });
    let proof = json!({"discordId": "900", "text": "done"});

    let (status, body) = post_json(&h.app, "/api/self-check", self_check_body(config, true, proof)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Missing Discord account information");
    assert_eq!(h.reviewer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_self_check_validation_errors() {
    let h = default_harness();
    let base = self_check_body(json!({"taskType": ["Plain Text"]}), true, json!({"text": "done"}));

    let mut unsupported = base.clone();
    unsupported["chainName"] = json!("Goerli");
    let (status, body) = post_json(&h.app, "/api/self-check", unsupported).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Unsupported chain");

    let mut undeployed = base.clone();
    undeployed["chainName"] = json!("Sepolia");
    let (status, body) = post_json(&h.app, "/api/self-check", undeployed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Contract not deployed on this chain");

    let mut missing = base.clone();
    missing.as_object_mut().unwrap().remove("proof");
    let (status, body) = post_json(&h.app, "/api/self-check", missing).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Missing required parameters");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let h = default_harness();
    let request = Request::builder()
        .method("POST")
        .uri("/api/self-check")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_count_self_checks() {
    let h = default_harness();
    let ok = self_check_body(json!({"taskType": ["Plain Text"]}), true, json!({"text": "done"}));
    let refused = self_check_body(json!({"taskType": ["Plain Text"]}), false, json!({"text": "done"}));
    post_json(&h.app, "/api/self-check", ok).await;
    post_json(&h.app, "/api/self-check", refused).await;

    let (status, text) = get_text(&h.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    for sample in [
        "self_checks_total 2",
        "self_checks_approved 1",
        "self_checks_rejected 1",
        "attestations_signed 1",
    ] {
        assert!(text.lines().any(|line| line == sample), "missing {}", sample);
    }
}

#[tokio::test]
async fn test_twitter_check_actions() {
    let h = harness(
        FakeTwitter {
            following: vec!["alice".to_string()],
            ..Default::default()
        },
        FakeDiscord::default(),
        ReviewOutcome::new(true, "ok"),
    );

    let (status, body) = post_json(
        &h.app,
        "/api/social/twitter/check-actions",
        json!({
            "encryptedTokens": token_bundle(),
            "action": "follow",
            "targetUser": "alice",
            "userId": "42"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"verified": true}));

    let (status, body) = post_json(
        &h.app,
        "/api/social/twitter/check-actions",
        json!({
            "encryptedTokens": token_bundle(),
            "action": "retweet",
            "tweetId": "1790",
            "userId": "42"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"verified": false}));

    let (status, body) = post_json(
        &h.app,
        "/api/social/twitter/check-actions",
        json!({"encryptedTokens": token_bundle(), "action": "bookmark", "userId": "42"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Invalid action type");
}

#[tokio::test]
async fn test_twitter_rate_limit_is_429() {
    let h = harness(
        FakeTwitter {
            rate_limited: true,
            ..Default::default()
        },
        FakeDiscord::default(),
        ReviewOutcome::new(true, "ok"),
    );

    let (status, body) = post_json(
        &h.app,
        "/api/social/twitter/check-actions",
        json!({
            "encryptedTokens": token_bundle(),
            "action": "follow",
            "targetUser": "alice",
            "userId": "42"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(error_of(&body).contains("rate limit"));
}

#[tokio::test]
async fn test_discord_check_guild() {
    let h = harness(
        FakeTwitter::default(),
        FakeDiscord {
            guilds: vec!["1234".to_string()],
            ..Default::default()
        },
        ReviewOutcome::new(true, "ok"),
    );

    let (status, body) = post_json(
        &h.app,
        "/api/social/discord/check-guild",
        json!({"encryptedTokens": token_bundle(), "guildId": "1234", "userId": "900"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"inGuild": true}));

    let (status, body) = post_json(
        &h.app,
        "/api/social/discord/check-guild",
        json!({"encryptedTokens": token_bundle(), "guildId": "1234", "userId": "901"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Discord account does not match the submitted user id");
}

#[tokio::test]
async fn test_account_verification_endpoints() {
    let h = default_harness();

    let (status, body) = post_json(
        &h.app,
        "/api/social/github/verify",
        json!({"encryptedTokens": token_bundle(), "userId": "7"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"verified": true, "userId": "7", "username": "bob-gh"}));

    let (status, body) = post_json(
        &h.app,
        "/api/social/twitter/verify",
        json!({"encryptedTokens": token_bundle(), "userId": "43"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], false);

    let (status, body) = post_json(
        &h.app,
        "/api/social/discord/verify",
        json!({"encryptedTokens": "bm90LWEtYnVuZGxl", "userId": "900"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Failed to decrypt social access tokens");
}

#[tokio::test]
async fn test_ai_review_endpoint() {
    let h = default_harness();

    let (status, body) = post_json(
        &h.app,
        "/api/ai-review",
        json!({
            "proofTypes": ["Plain Text"],
            "proofData": {"text": "done"},
            "taskName": "Essay",
            "taskDescription": "Write a short essay",
            "aiReviewPrompt": "Check it"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"approved": true, "reviewComment": "Looks complete"}));
    assert_eq!(h.reviewer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_profile_signature_recovers_to_signer() {
    let h = default_harness();

    let (status, body) = post_json(
        &h.app,
        "/api/profile/sign",
        json!({
            "nickname": "alice",
            "avatar": "https://example.com/a.png",
            "socialAccount": "@alice",
            "subject": SUBMITTER
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nickname"], "alice");
    assert_eq!(body["socialAccount"], "@alice");

    let claim = UserProfileClaim {
        nickname: "alice".to_string(),
        avatar: "https://example.com/a.png".to_string(),
        social_account: "@alice".to_string(),
        subject: SUBMITTER.parse().unwrap(),
    };
    let domain = ProfileDomain {
        chain_id: 59141,
        verifying_contract: PORTAL.parse().unwrap(),
    };
    let recovered = recover_signer(
        &claim.signing_hash(&domain),
        body["signature"].as_str().unwrap(),
        SigningScheme::RawHash,
    )
    .unwrap();
    assert_eq!(recovered, h.signer);

    let (status, body) = post_json(
        &h.app,
        "/api/profile/sign",
        json!({"nickname": "alice", "avatar": "", "socialAccount": "@alice", "subject": SUBMITTER}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Missing required parameters");
}
