use bounty_types::{ProofType, TypesError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("No valid proof content found")]
    NoValidProof,

    #[error("Failed to process {proof_type}")]
    ProofProcessing {
        proof_type: ProofType,
        #[source]
        source: Box<ReviewError>,
    },

    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    #[error("Invalid review request: {0}")]
    InvalidRequest(String),

    #[error("{service} request failed with status {status}")]
    Upstream { service: &'static str, status: u16 },

    #[error("{service} returned an unexpected response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    #[error("Failed to reach {service}: {reason}")]
    Transport {
        service: &'static str,
        reason: String,
    },
}

impl ReviewError {
    pub(crate) fn processing(proof_type: &ProofType, source: ReviewError) -> Self {
        ReviewError::ProofProcessing {
            proof_type: proof_type.clone(),
            source: Box::new(source),
        }
    }

    /// Evidence problems the submitter can fix, as opposed to upstream faults.
    pub fn is_client_fault(&self) -> bool {
        match self {
            ReviewError::NoValidProof
            | ReviewError::InvalidProof(_)
            | ReviewError::InvalidRequest(_) => true,
            ReviewError::ProofProcessing { source, .. } => source.is_client_fault(),
            // Referenced resource does not exist
            ReviewError::Upstream { status, .. } => *status == 404,
            ReviewError::InvalidResponse { .. } | ReviewError::Transport { .. } => false,
        }
    }
}

impl From<TypesError> for ReviewError {
    fn from(err: TypesError) -> Self {
        ReviewError::InvalidRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
