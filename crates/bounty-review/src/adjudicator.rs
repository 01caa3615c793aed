//! Turns collected evidence into an approve/reject decision.

use crate::model::LanguageModel;
use bounty_types::{ReviewOutcome, MAX_REVIEW_COMMENT_CHARS};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AiAdjudicator {
    model: Arc<dyn LanguageModel>,
}

impl AiAdjudicator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Ask the model for a decision. Never fails: anything short of a
    /// well-formed `{approved, reviewComment}` answer is a rejection.
    pub async fn adjudicate(
        &self,
        content: &str,
        task_name: &str,
        task_description: &str,
        review_prompt: &str,
    ) -> ReviewOutcome {
        let prompt = build_prompt(content, task_name, task_description, review_prompt);

        let raw = match self.model.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Model call failed");
                return ReviewOutcome::processing_error();
            }
        };

        let outcome = parse_decision(&raw).unwrap_or_else(|| {
            warn!(response_len = raw.len(), "Unusable model response");
            ReviewOutcome::processing_error()
        });
        info!(approved = outcome.approved, "AI review decided");
        outcome
    }
}

pub fn build_prompt(
    content: &str,
    task_name: &str,
    task_description: &str,
    review_prompt: &str,
) -> String {
    json!({
        "task_info": {
            "name": task_name,
            "description": task_description,
            "review_prompt": review_prompt,
        },
        "submission_content": content,
        "review_instructions": format!(
            "Review the submission against the task and the review prompt. Reply with a JSON \
             object only, without markdown: {{\"approved\": boolean, \"reviewComment\": string}}. \
             reviewComment explains the decision in at most {} characters.",
            MAX_REVIEW_COMMENT_CHARS
        ),
        "example_response": {
            "approved": true,
            "reviewComment": "The submission meets all requirements",
        },
    })
    .to_string()
}

/// Remove a surrounding ``` or ```json fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}

/// Strict shape check: `approved` must be a boolean and `reviewComment` a string.
pub fn parse_decision(raw: &str) -> Option<ReviewOutcome> {
    let value: Value = serde_json::from_str(strip_code_fence(raw)).ok()?;
    let approved = value.get("approved")?.as_bool()?;
    let comment = value.get("reviewComment")?.as_str()?;
    Some(ReviewOutcome::new(approved, comment))
}
