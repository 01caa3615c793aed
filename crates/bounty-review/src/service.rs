use crate::adjudicator::AiAdjudicator;
use crate::collector::ContentCollector;
use crate::error::{Result, ReviewError};
use async_trait::async_trait;
use bounty_types::{ProofType, ReviewOutcome, SubmissionProof, TaskConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiReviewRequest {
    pub proof_types: Vec<ProofType>,
    pub proof_data: SubmissionProof,
    pub task_name: String,
    pub task_description: String,
    pub ai_review_prompt: String,
    pub task_config: Option<TaskConfig>,
}

impl AiReviewRequest {
    /// Review request for a task, using the task's own proof kinds and prompt.
    pub fn for_task(
        config: &TaskConfig,
        proof: SubmissionProof,
        task_name: impl Into<String>,
        task_description: impl Into<String>,
    ) -> Self {
        Self {
            proof_types: config.task_type.clone(),
            proof_data: proof,
            task_name: task_name.into(),
            task_description: task_description.into(),
            ai_review_prompt: config.ai_review_prompt().unwrap_or_default().to_string(),
            task_config: Some(config.clone()),
        }
    }
}

#[async_trait]
pub trait AiReviewer: Send + Sync {
    async fn review(&self, request: &AiReviewRequest) -> Result<ReviewOutcome>;
}

pub struct AiReviewService {
    collector: ContentCollector,
    adjudicator: AiAdjudicator,
}

impl AiReviewService {
    pub fn new(collector: ContentCollector, adjudicator: AiAdjudicator) -> Self {
        Self {
            collector,
            adjudicator,
        }
    }
}

#[async_trait]
impl AiReviewer for AiReviewService {
    async fn review(&self, request: &AiReviewRequest) -> Result<ReviewOutcome> {
        if request.ai_review_prompt.trim().is_empty() {
            return Err(ReviewError::InvalidRequest(
                "AI review prompt is required".to_string(),
            ));
        }

        let content = self
            .collector
            .collect(
                &request.proof_types,
                &request.proof_data,
                request.task_config.as_ref(),
            )
            .await?;
        info!(
            proof_types = request.proof_types.len(),
            content_len = content.len(),
            "Evidence collected"
        );

        Ok(self
            .adjudicator
            .adjudicate(
                &content,
                &request.task_name,
                &request.task_description,
                &request.ai_review_prompt,
            )
            .await)
    }
}
