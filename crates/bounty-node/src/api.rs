use crate::error::ApiError;
use crate::node::BountyNode;
use crate::self_check::SelfCheckRequest;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use bounty_crypto::{Address, ProfileSignature, UserProfileClaim};
use bounty_review::AiReviewRequest;
use bounty_social::{AccountVerification, Platform};
use bounty_types::{ReviewOutcome, SignedAttestation, XAction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

type AppState = Arc<BountyNode>;
type ApiResult<T> = Result<Json<T>, ApiError>;

const MISSING_PARAMETERS: &str = "Missing required parameters";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckActionsRequest {
    encrypted_tokens: Option<String>,
    action: Option<String>,
    target_user: Option<String>,
    tweet_id: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckActionsResponse {
    verified: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckGuildRequest {
    encrypted_tokens: Option<String>,
    guild_id: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckGuildResponse {
    in_guild: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyAccountRequest {
    encrypted_tokens: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSignRequest {
    nickname: Option<String>,
    avatar: Option<String>,
    social_account: Option<String>,
    subject: Option<String>,
}

pub fn build_router(node: BountyNode) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/api/self-check", post(self_check))
        .route("/api/ai-review", post(ai_review))
        .route("/api/social/twitter/check-actions", post(twitter_check_actions))
        .route("/api/social/discord/check-guild", post(discord_check_guild))
        .route("/api/social/twitter/verify", post(verify_twitter))
        .route("/api/social/discord/verify", post(verify_discord))
        .route("/api/social/github/verify", post(verify_github))
        .route("/api/profile/sign", post(sign_profile))
        .with_state(Arc::new(node))
}

/// Bind `host:port` and serve in the background.
pub async fn start_api_server(node: BountyNode, host: &str, port: u16) -> anyhow::Result<JoinHandle<()>> {
    let app = build_router(node);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "API server listening");

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    }))
}

async fn health() -> &'static str {
    "OK"
}

async fn get_metrics(State(node): State<AppState>) -> String {
    node.metrics.gather()
}

async fn self_check(
    State(node): State<AppState>,
    payload: Result<Json<SelfCheckRequest>, JsonRejection>,
) -> ApiResult<SignedAttestation> {
    let request = body(payload)?;
    node.self_check().run(request).await.map(Json)
}

async fn ai_review(
    State(node): State<AppState>,
    payload: Result<Json<AiReviewRequest>, JsonRejection>,
) -> ApiResult<ReviewOutcome> {
    let request = body(payload)?;
    node.metrics.ai_reviews_total.inc();

    let outcome = node.reviewer.review(&request).await?;
    if outcome.approved {
        node.metrics.ai_reviews_approved.inc();
    }
    debug!(approved = outcome.approved, "AI review answered");
    Ok(Json(outcome))
}

async fn twitter_check_actions(
    State(node): State<AppState>,
    payload: Result<Json<CheckActionsRequest>, JsonRejection>,
) -> ApiResult<CheckActionsResponse> {
    let request = body(payload)?;

    let action = match request.action.as_deref() {
        Some("follow") => XAction::Follow,
        Some("like") => XAction::Like,
        Some("retweet") => XAction::Retweet,
        _ => return Err(ApiError::bad_request("Invalid action type")),
    };
    let target = match action {
        XAction::Follow => request.target_user,
        XAction::Like | XAction::Retweet => request.tweet_id,
    };
    let (bundle, user_id, target) = match (
        non_empty(request.encrypted_tokens),
        non_empty(request.user_id),
        non_empty(target),
    ) {
        (Some(bundle), Some(user_id), Some(target)) => (bundle, user_id, target),
        _ => return Err(ApiError::bad_request(MISSING_PARAMETERS)),
    };

    node.metrics.social_checks_total.inc();
    let verified = node
        .verifier
        .twitter_action(&bundle, &user_id, action, &target)
        .await
        .inspect_err(|_| node.metrics.social_check_failures.inc())?;

    Ok(Json(CheckActionsResponse { verified }))
}

async fn discord_check_guild(
    State(node): State<AppState>,
    payload: Result<Json<CheckGuildRequest>, JsonRejection>,
) -> ApiResult<CheckGuildResponse> {
    let request = body(payload)?;
    let (bundle, guild_id, user_id) = match (
        non_empty(request.encrypted_tokens),
        non_empty(request.guild_id),
        non_empty(request.user_id),
    ) {
        (Some(bundle), Some(guild_id), Some(user_id)) => (bundle, guild_id, user_id),
        _ => return Err(ApiError::bad_request(MISSING_PARAMETERS)),
    };

    node.metrics.social_checks_total.inc();
    let in_guild = node
        .verifier
        .discord_membership(&bundle, &user_id, &guild_id)
        .await
        .inspect_err(|_| node.metrics.social_check_failures.inc())?;

    Ok(Json(CheckGuildResponse { in_guild }))
}

async fn verify_twitter(
    state: State<AppState>,
    payload: Result<Json<VerifyAccountRequest>, JsonRejection>,
) -> ApiResult<AccountVerification> {
    verify_account(state, Platform::X, payload).await
}

async fn verify_discord(
    state: State<AppState>,
    payload: Result<Json<VerifyAccountRequest>, JsonRejection>,
) -> ApiResult<AccountVerification> {
    verify_account(state, Platform::Discord, payload).await
}

async fn verify_github(
    state: State<AppState>,
    payload: Result<Json<VerifyAccountRequest>, JsonRejection>,
) -> ApiResult<AccountVerification> {
    verify_account(state, Platform::Github, payload).await
}

async fn verify_account(
    State(node): State<AppState>,
    platform: Platform,
    payload: Result<Json<VerifyAccountRequest>, JsonRejection>,
) -> ApiResult<AccountVerification> {
    let request = body(payload)?;
    let (bundle, user_id) = match (non_empty(request.encrypted_tokens), non_empty(request.user_id)) {
        (Some(bundle), Some(user_id)) => (bundle, user_id),
        _ => return Err(ApiError::bad_request(MISSING_PARAMETERS)),
    };

    let verification = node.verifier.verify_account(platform, &bundle, &user_id).await?;
    Ok(Json(verification))
}

async fn sign_profile(
    State(node): State<AppState>,
    payload: Result<Json<ProfileSignRequest>, JsonRejection>,
) -> ApiResult<ProfileSignature> {
    let request = body(payload)?;
    let (nickname, avatar, social_account, subject) = match (
        non_empty(request.nickname),
        non_empty(request.avatar),
        non_empty(request.social_account),
        non_empty(request.subject),
    ) {
        (Some(n), Some(a), Some(s), Some(subject)) => (n, a, s, subject),
        _ => return Err(ApiError::bad_request(MISSING_PARAMETERS)),
    };

    let subject: Address = subject
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid subject address"))?;
    let domain = node.profile_domain.ok_or_else(|| {
        ApiError::Configuration("profile signing needs PORTAL_ADDRESS".to_string())
    })?;

    let claim = UserProfileClaim {
        nickname,
        avatar,
        social_account,
        subject,
    };
    let signature = node
        .signer
        .sign_profile(&claim, &domain)
        .map_err(ApiError::internal)?;
    Ok(Json(signature))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
