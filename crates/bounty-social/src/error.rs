use crate::platform::Platform;
use bounty_crypto::CryptoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Missing {platform} account information")]
    MissingCredentials { platform: Platform },

    #[error("Failed to decrypt social access tokens")]
    Decryption(#[from] CryptoError),

    #[error("{platform} account does not match the submitted user id")]
    AccountMismatch { platform: Platform },

    #[error("{} verification failed: {reason}", .platform.service())]
    NotSatisfied { platform: Platform, reason: String },

    #[error("{} API rate limit exceeded, please try again later", .platform.service())]
    RateLimited { platform: Platform },

    #[error("{} API request failed with status {status}", .platform.service())]
    Upstream { platform: Platform, status: u16 },

    #[error("{} API returned an unexpected response: {reason}", .platform.service())]
    InvalidResponse { platform: Platform, reason: String },

    #[error("Failed to reach {}: {reason}", .platform.service())]
    Transport { platform: Platform, reason: String },
}

impl VerificationError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, VerificationError::RateLimited { .. })
    }

    /// Failures caused by the submitter's evidence rather than a platform fault.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            VerificationError::MissingCredentials { .. }
                | VerificationError::Decryption(_)
                | VerificationError::AccountMismatch { .. }
                | VerificationError::NotSatisfied { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VerificationError>;
