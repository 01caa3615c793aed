//! Proof kinds a task can demand and the evidence a submitter provides.

use crate::error::{Result, TypesError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A proof kind tag as it appears in `taskType`.
///
/// Unrecognised tags are kept verbatim in [`ProofType::Other`] so that a task
/// authored by a newer client still deserializes; consumers skip them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProofType {
    PlainText,
    Image,
    GithubPullRequest,
    ContractVerification,
    XPost,
    XFollow,
    XLike,
    XRetweet,
    JoinDiscord,
    Other(String),
}

impl ProofType {
    pub fn as_str(&self) -> &str {
        match self {
            ProofType::PlainText => "Plain Text",
            ProofType::Image => "Image",
            ProofType::GithubPullRequest => "Github Pull Request",
            ProofType::ContractVerification => "Contract Verification",
            ProofType::XPost => "X Post",
            ProofType::XFollow => "X Follow",
            ProofType::XLike => "X Like",
            ProofType::XRetweet => "X Retweet",
            ProofType::JoinDiscord => "Join Discord",
            ProofType::Other(tag) => tag,
        }
    }

    /// Kinds whose evidence can be collected and judged by the AI reviewer.
    pub fn is_ai_reviewable(&self) -> bool {
        matches!(
            self,
            ProofType::PlainText
                | ProofType::Image
                | ProofType::GithubPullRequest
                | ProofType::ContractVerification
        )
    }

    pub fn is_social(&self) -> bool {
        matches!(
            self,
            ProofType::XPost
                | ProofType::XFollow
                | ProofType::XLike
                | ProofType::XRetweet
                | ProofType::JoinDiscord
        )
    }
}

impl From<String> for ProofType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Plain Text" => ProofType::PlainText,
            "Image" => ProofType::Image,
            "Github Pull Request" => ProofType::GithubPullRequest,
            "Contract Verification" => ProofType::ContractVerification,
            "X Post" => ProofType::XPost,
            "X Follow" => ProofType::XFollow,
            "X Like" => ProofType::XLike,
            "X Retweet" => ProofType::XRetweet,
            "Join Discord" => ProofType::JoinDiscord,
            _ => ProofType::Other(tag),
        }
    }
}

impl From<ProofType> for String {
    fn from(proof_type: ProofType) -> Self {
        proof_type.as_str().to_string()
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evidence submitted for a task. Sparse: only the fields matching the task's
/// proof kinds are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionProof {
    pub text: Option<String>,
    /// Uploaded image URL
    pub image: Option<String>,
    /// Pull request URL, `https://github.com/<owner>/<repo>/pull/<number>`
    pub github: Option<String>,
    /// Deployed contract address
    pub contract: Option<String>,

    pub x_user_name: Option<String>,
    pub x_name: Option<String>,
    pub x_id: Option<String>,
    pub x_follow: Option<bool>,
    pub x_like: Option<bool>,
    pub x_retweet: Option<bool>,

    pub discord_user_name: Option<String>,
    pub discord_name: Option<String>,
    pub discord_id: Option<String>,

    /// Base64 AES-GCM bundle of platform access tokens, see [`crate::SocialTokens`]
    pub encrypted_tokens: Option<String>,
}

impl SubmissionProof {
    /// Parse the JSON string stored on-chain as a submission's proof.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| TypesError::InvalidProof(e.to_string()))
    }

    pub fn encrypted_tokens(&self) -> Option<&str> {
        non_empty(&self.encrypted_tokens)
    }

    pub fn x_id(&self) -> Option<&str> {
        non_empty(&self.x_id)
    }

    pub fn discord_id(&self) -> Option<&str> {
        non_empty(&self.discord_id)
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
