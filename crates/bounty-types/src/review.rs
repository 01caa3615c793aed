use serde::{Deserialize, Serialize};

/// Longest review comment that is embedded into an attestation.
pub const MAX_REVIEW_COMMENT_CHARS: usize = 100;

/// Comment used whenever the model output cannot be trusted.
pub const AI_REVIEW_ERROR_COMMENT: &str = "Error processing AI review response";

/// Result text signed when no AI review replaced it.
pub const SELF_CHECK_SUCCESS: &str = "Check Success";

/// Decision on a submission, by a human reviewer or the AI adjudicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub approved: bool,
    pub review_comment: String,
}

impl ReviewOutcome {
    /// Build an outcome, clamping the comment to [`MAX_REVIEW_COMMENT_CHARS`].
    pub fn new(approved: bool, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        let review_comment = match comment.char_indices().nth(MAX_REVIEW_COMMENT_CHARS) {
            Some((cut, _)) => comment[..cut].to_string(),
            None => comment,
        };
        Self {
            approved,
            review_comment,
        }
    }

    /// The fail-closed outcome for unusable model output.
    pub fn processing_error() -> Self {
        Self::new(false, AI_REVIEW_ERROR_COMMENT)
    }
}

/// Server signature over a review result, submitted on-chain by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedAttestation {
    /// `0x`-prefixed 65-byte `r || s || v` signature
    pub signature: String,
    pub check_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_truncated_on_char_boundary() {
        let long = "é".repeat(150);
        let outcome = ReviewOutcome::new(true, long);
        assert_eq!(outcome.review_comment.chars().count(), MAX_REVIEW_COMMENT_CHARS);
    }

    #[test]
    fn test_short_comment_untouched() {
        let outcome = ReviewOutcome::new(false, "Missing required detail");
        assert_eq!(outcome.review_comment, "Missing required detail");
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(ReviewOutcome::processing_error()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "approved": false,
                "reviewComment": "Error processing AI review response"
            })
        );
    }
}
