use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption key is not configured")]
    MissingEncryptionKey,

    #[error("Invalid encryption key: {0}")]
    InvalidEncryptionKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Failed to decrypt data")]
    DecryptionFailed,

    #[error("Invalid SIGNER_PRIVATE_KEY format: {0}")]
    InvalidSigningKey(String),

    #[error("Unknown signing scheme: {0}")]
    UnknownScheme(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
