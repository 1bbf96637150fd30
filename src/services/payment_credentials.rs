//! AES-256-GCM handling of the payment provider credentials stored per tenant.
//!
//! Stored values are `base64(nonce || ciphertext || tag)` with a 12 byte nonce.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use thiserror::Error;

use crate::errors::ServiceError;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential key must be base64 encoded 32 bytes")]
    InvalidKey,
    #[error("credential is not valid base64: {0}")]
    Encoding(String),
    #[error("credential payload is too short")]
    Truncated,
    #[error("credential could not be decrypted")]
    Decrypt,
    #[error("credential could not be encrypted")]
    Encrypt,
    #[error("decrypted credential is not valid UTF-8")]
    Utf8,
}

impl From<CredentialError> for ServiceError {
    fn from(err: CredentialError) -> Self {
        ServiceError::InternalError(format!("Payment credential unavailable: {}", err))
    }
}

#[derive(Clone)]
pub struct CredentialCipher {
    key: [u8; 32],
}

impl fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl CredentialCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn from_base64_key(encoded: &str) -> Result<Self, CredentialError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CredentialError::InvalidKey)?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CredentialError::InvalidKey)?;
        Ok(Self::new(key))
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CredentialError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher()
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CredentialError::Encrypt)?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(combined))
    }

    /// Recovers the plaintext access token.
    pub fn decrypt(&self, encoded: &str) -> Result<String, CredentialError> {
        let combined = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CredentialError::Encoding(e.to_string()))?;
        if combined.len() <= NONCE_LEN {
            return Err(CredentialError::Truncated);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CredentialError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CredentialError::Utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decrypts_what_it_encrypted() {
        let cipher = CredentialCipher::new([7u8; 32]);
        let stored = cipher.encrypt("APP_USR-123").unwrap();
        assert_ne!(stored, "APP_USR-123");
        assert_eq!(cipher.decrypt(&stored).unwrap(), "APP_USR-123");
    }

    #[test]
    fn wrong_key_fails() {
        let stored = CredentialCipher::new([1u8; 32]).encrypt("token").unwrap();
        let other = CredentialCipher::new([2u8; 32]);
        assert_matches!(other.decrypt(&stored), Err(CredentialError::Decrypt));
    }

    #[test]
    fn rejects_garbage() {
        let cipher = CredentialCipher::new([1u8; 32]);
        assert_matches!(cipher.decrypt("%%%"), Err(CredentialError::Encoding(_)));
        assert_matches!(
            cipher.decrypt(&STANDARD.encode([0u8; 4])),
            Err(CredentialError::Truncated)
        );
    }

    #[test]
    fn key_must_be_32_bytes() {
        assert!(CredentialCipher::from_base64_key(&STANDARD.encode([9u8; 32])).is_ok());
        assert_matches!(
            CredentialCipher::from_base64_key(&STANDARD.encode([9u8; 16])),
            Err(CredentialError::InvalidKey)
        );
    }

    #[test]
    fn maps_to_internal_error() {
        let err: ServiceError = CredentialError::Decrypt.into();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Internal);
    }
}
