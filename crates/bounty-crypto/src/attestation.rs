//! Review attestations verifiable by the BountyBoard contract.
//!
//! The signed message is `keccak256(abi.encode(uint256 boardId, uint256 taskId,
//! address submitter, string checkData))`. Under [`SigningScheme::Eip191`] that
//! hash is signed as a 32-byte personal message, which is what the deployed
//! contract recovers with `toEthSignedMessageHash`; [`SigningScheme::RawHash`]
//! signs the hash itself for verifiers that call `ecrecover` directly.

use crate::error::{CryptoError, Result};
use alloy::primitives::{eip191_hash_message, keccak256, Address, Signature, B256, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use alloy::sol_types::SolValue;
use bounty_types::SignedAttestation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    /// `\x19Ethereum Signed Message:\n32` prefix over the attestation hash
    #[default]
    Eip191,
    /// Sign the attestation hash as-is
    #[serde(rename = "raw")]
    RawHash,
}

impl SigningScheme {
    /// The digest actually handed to ECDSA for a given attestation hash.
    pub fn digest(&self, hash: &B256) -> B256 {
        match self {
            SigningScheme::Eip191 => eip191_hash_message(hash.as_slice()),
            SigningScheme::RawHash => *hash,
        }
    }
}

impl FromStr for SigningScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eip191" | "personal" => Ok(SigningScheme::Eip191),
            "raw" | "rawhash" | "raw_hash" => Ok(SigningScheme::RawHash),
            other => Err(CryptoError::UnknownScheme(other.to_string())),
        }
    }
}

/// ABI-encode and hash the attestation fields.
pub fn attestation_hash(board_id: U256, task_id: U256, submitter: Address, check_data: &str) -> B256 {
    let encoded = (board_id, task_id, submitter, check_data.to_string()).abi_encode_params();
    keccak256(encoded)
}

/// Recover the address that produced `signature_hex` over an attestation hash.
pub fn recover_signer(hash: &B256, signature_hex: &str, scheme: SigningScheme) -> Result<Address> {
    let bytes = hex::decode(signature_hex.trim_start_matches("0x"))
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let signature =
        Signature::from_raw(&bytes).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    signature
        .recover_address_from_prehash(&scheme.digest(hash))
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}

/// Holds the process-wide review signing key.
#[derive(Clone)]
pub struct AttestationSigner {
    signer: PrivateKeySigner,
    scheme: SigningScheme,
}

impl AttestationSigner {
    /// Parse a `0x`-prefixed 32-byte hex private key.
    pub fn from_hex(private_key: &str, scheme: SigningScheme) -> Result<Self> {
        let key = private_key.trim();
        if !key.starts_with("0x") || key.len() != 66 {
            return Err(CryptoError::InvalidSigningKey(
                "expected 0x followed by 64 hex characters".to_string(),
            ));
        }

        let bytes =
            hex::decode(&key[2..]).map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))?;
        let signer = PrivateKeySigner::from_slice(&bytes)
            .map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))?;

        Ok(Self { signer, scheme })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn scheme(&self) -> SigningScheme {
        self.scheme
    }

    /// Sign an already-final 32-byte digest, returning `0x` + 65-byte hex.
    pub fn sign_digest(&self, digest: &B256) -> Result<String> {
        let signature = self
            .signer
            .sign_hash_sync(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }

    pub fn sign_attestation(
        &self,
        board_id: U256,
        task_id: U256,
        submitter: Address,
        check_data: &str,
    ) -> Result<SignedAttestation> {
        let hash = attestation_hash(board_id, task_id, submitter, check_data);
        let signature = self.sign_digest(&self.scheme.digest(&hash))?;

        Ok(SignedAttestation {
            signature,
            check_data: check_data.to_string(),
        })
    }
}

impl fmt::Debug for AttestationSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttestationSigner")
            .field("address", &self.address())
            .field("scheme", &self.scheme)
            .finish()
    }
}
