pub mod attestation;
pub mod error;
pub mod profile;
pub mod token_cipher;

pub use alloy::primitives::{Address, B256, U256};
pub use attestation::{attestation_hash, recover_signer, AttestationSigner, SigningScheme};
pub use error::{CryptoError, Result};
pub use profile::{ProfileDomain, ProfileSignature, UserProfileClaim};
pub use token_cipher::TokenCipher;
