pub mod error;
pub mod proof;
pub mod review;
pub mod social;
pub mod task;

pub use error::{Result, TypesError};
pub use proof::{ProofType, SubmissionProof};
pub use review::{
    ReviewOutcome, SignedAttestation, AI_REVIEW_ERROR_COMMENT, MAX_REVIEW_COMMENT_CHARS,
    SELF_CHECK_SUCCESS,
};
pub use social::{SocialTokens, XAction};
pub use task::{ContractNetwork, SocialRequirements, TaskConfig, TaskDetail};
