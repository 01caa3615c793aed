//! Self-check: approve a submission without a human reviewer by running the
//! task's social and AI checks, then signing an attestation the BountyBoard
//! contract accepts.

use crate::chains::find_chain;
use crate::error::ApiError;
use crate::metrics::Metrics;
use bounty_crypto::{Address, AttestationSigner, U256};
use bounty_review::{AiReviewRequest, AiReviewer};
use bounty_social::SocialVerifier;
use bounty_types::{SignedAttestation, SubmissionProof, TaskConfig, TaskDetail, SELF_CHECK_SUCCESS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelfCheckRequest {
    /// Decimal number, decimal string or `0x` hex string
    pub board_id: Option<Value>,
    pub board_config: Option<Value>,
    pub task_id: Option<Value>,
    pub address: Option<String>,
    /// Submission proof, usually the JSON string stored on-chain
    pub proof: Option<Value>,
    pub chain_name: Option<String>,
    pub task: Option<TaskDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfCheckState {
    Validating,
    SocialChecking,
    AiReviewing,
    Signing,
    Done,
    Failed,
}

/// A request that passed validation.
struct ValidatedCheck {
    board_id: U256,
    task_id: U256,
    submitter: Address,
    proof: SubmissionProof,
    task: TaskDetail,
    config: TaskConfig,
}

struct Progress {
    state: SelfCheckState,
    board_id: String,
    task_id: String,
}

impl Progress {
    fn advance(&mut self, next: SelfCheckState) {
        crate::log_state_change!(
            self.state,
            next,
            board_id = %self.board_id,
            task_id = %self.task_id,
            "Self-check transition"
        );
        self.state = next;
    }
}

pub struct SelfCheckOrchestrator {
    signer: Arc<AttestationSigner>,
    verifier: Arc<SocialVerifier>,
    reviewer: Arc<dyn AiReviewer>,
    metrics: Metrics,
}

impl SelfCheckOrchestrator {
    pub fn new(
        signer: Arc<AttestationSigner>,
        verifier: Arc<SocialVerifier>,
        reviewer: Arc<dyn AiReviewer>,
        metrics: Metrics,
    ) -> Self {
        Self {
            signer,
            verifier,
            reviewer,
            metrics,
        }
    }

    pub async fn run(&self, request: SelfCheckRequest) -> Result<SignedAttestation, ApiError> {
        let started = Instant::now();
        self.metrics.self_checks_total.inc();

        let mut progress = Progress {
            state: SelfCheckState::Validating,
            board_id: display_id(request.board_id.as_ref()),
            task_id: display_id(request.task_id.as_ref()),
        };

        let result = self.execute(request, &mut progress).await;
        match &result {
            Ok(_) => {
                progress.advance(SelfCheckState::Done);
                self.metrics.self_checks_approved.inc();
            }
            Err(err) => {
                progress.advance(SelfCheckState::Failed);
                match err {
                    ApiError::BadRequest(_) | ApiError::RateLimited(_) => {
                        info!(reason = %err, "Self-check rejected");
                        self.metrics.self_checks_rejected.inc();
                    }
                    ApiError::Internal(_) | ApiError::Configuration(_) => {
                        self.metrics.self_checks_failed.inc();
                    }
                }
            }
        }

        self.metrics
            .self_check_duration
            .observe(started.elapsed().as_secs_f64());
        result
    }

    async fn execute(
        &self,
        request: SelfCheckRequest,
        progress: &mut Progress,
    ) -> Result<SignedAttestation, ApiError> {
        let check = validate(request)?;

        progress.advance(SelfCheckState::SocialChecking);
        self.metrics.social_checks_total.inc();
        if let Err(err) = self.verifier.verify(&check.config, &check.proof).await {
            self.metrics.social_check_failures.inc();
            warn!(error = %err, "Social verification failed");
            return Err(ApiError::BadRequest(err.to_string()));
        }

        let mut check_data = SELF_CHECK_SUCCESS.to_string();

        if check.config.ai_review {
            progress.advance(SelfCheckState::AiReviewing);
            self.metrics.ai_reviews_total.inc();

            let review = AiReviewRequest::for_task(
                &check.config,
                check.proof,
                check.task.name,
                check.task.description,
            );
            let outcome = self.reviewer.review(&review).await?;
            if !outcome.approved {
                return Err(ApiError::BadRequest(outcome.review_comment));
            }

            self.metrics.ai_reviews_approved.inc();
            if !outcome.review_comment.is_empty() {
                check_data = outcome.review_comment;
            }
        }

        progress.advance(SelfCheckState::Signing);
        let attestation = self
            .signer
            .sign_attestation(check.board_id, check.task_id, check.submitter, &check_data)
            .map_err(ApiError::internal)?;
        self.metrics.attestations_signed.inc();

        debug!(signer = %self.signer.address(), "Attestation signed");
        Ok(attestation)
    }
}

fn validate(request: SelfCheckRequest) -> Result<ValidatedCheck, ApiError> {
    let missing = || ApiError::bad_request("Missing required parameters");

    let board_id = request.board_id.filter(is_present).ok_or_else(missing)?;
    let task_id = request.task_id.filter(is_present).ok_or_else(missing)?;
    let address = request
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(missing)?;
    let proof = request.proof.filter(is_present).ok_or_else(missing)?;
    let chain_name = request
        .chain_name
        .filter(|c| !c.is_empty())
        .ok_or_else(missing)?;
    let task = request.task.ok_or_else(missing)?;

    let chain = find_chain(&chain_name).ok_or_else(|| ApiError::bad_request("Unsupported chain"))?;
    if chain.bounty_board().is_none() {
        return Err(ApiError::bad_request("Contract not deployed on this chain"));
    }

    if !task.allow_self_check {
        return Err(ApiError::bad_request("Task does not allow self-check"));
    }

    let board_id = parse_id(&board_id).ok_or_else(|| ApiError::bad_request("Invalid boardId"))?;
    let task_id = parse_id(&task_id).ok_or_else(|| ApiError::bad_request("Invalid taskId"))?;
    let submitter: Address = address
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid submitter address"))?;

    let proof = match proof {
        Value::String(raw) => SubmissionProof::from_json(&raw),
        other => serde_json::from_value(other)
            .map_err(|e| bounty_types::TypesError::InvalidProof(e.to_string())),
    }
    .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let config = task
        .task_config()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    debug!(chain = chain.name, chain_id = chain.chain_id, "Self-check request validated");
    Ok(ValidatedCheck {
        board_id,
        task_id,
        submitter,
        proof,
        task,
        config,
    })
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Board and task ids are `uint256` on-chain; clients send them as JSON
/// numbers or as decimal/hex strings.
pub fn parse_id(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}
