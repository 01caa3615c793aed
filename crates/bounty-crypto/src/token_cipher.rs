use crate::error::{CryptoError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use bounty_types::SocialTokens;
use rand::RngCore;
use std::fmt;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES-256-GCM cipher for the social token bundle.
///
/// Wire format is base64 of `nonce(12) || ciphertext || tag(16)`, the layout
/// WebCrypto produces when the nonce is prepended to its output.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build from the base64 key kept in configuration.
    pub fn from_base64_key(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(CryptoError::MissingEncryptionKey);
        }

        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidEncryptionKey(e.to_string()))?;
        let key: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidEncryptionKey(format!(
                "expected {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            ))
        })?;

        Ok(Self::new(&key))
    }

    /// Generate a fresh base64 key suitable for `from_base64_key`.
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        general_purpose::STANDARD.encode(key)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(combined))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let combined = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::DecryptionFailed)?;
        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::DecryptionFailed);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Decrypt and parse a client token bundle.
    pub fn decrypt_tokens(&self, encoded: &str) -> Result<SocialTokens> {
        let json = self.decrypt(encoded)?;
        serde_json::from_str(&json).map_err(|_| CryptoError::DecryptionFailed)
    }

    pub fn encrypt_tokens(&self, tokens: &SocialTokens) -> Result<String> {
        let json = serde_json::to_string(tokens)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        self.encrypt(&json)
    }
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenCipher(..)")
    }
}
