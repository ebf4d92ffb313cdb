//! AES-256-GCM encryption for credentials at rest.
//!
//! Tokens are stored as hex-encoded `nonce || ciphertext`. The empty string
//! round-trips to the empty string so unset credentials stay unset.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::{AppError, AppResult};

/// Size of the AES-256 key in bytes.
const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes.
const NONCE_SIZE: usize = 12;

/// Cipher for user credential fields.
#[derive(Clone)]
pub struct TokenCipher {
    key: [u8; KEY_SIZE],
}

impl TokenCipher {
    /// Build a cipher from a hex-encoded 32-byte key.
    pub fn new(hex_key: &str) -> AppResult<Self> {
        let raw = hex::decode(hex_key)
            .map_err(|e| AppError::Crypto(format!("invalid encryption key: {}", e)))?;
        let key: [u8; KEY_SIZE] = raw.try_into().map_err(|_| {
            AppError::Crypto("encryption key must be 32 bytes (64 hex chars)".to_string())
        })?;
        Ok(TokenCipher { key })
    }

    /// Encrypt a plaintext credential. Empty input yields empty output.
    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Crypto(format!("encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(hex::encode(out))
    }

    /// Decrypt a hex-armored credential. Empty input yields empty output.
    pub fn decrypt(&self, ciphertext_hex: &str) -> AppResult<String> {
        if ciphertext_hex.is_empty() {
            return Ok(String::new());
        }

        let raw = hex::decode(ciphertext_hex)
            .map_err(|e| AppError::Crypto(format!("invalid ciphertext: {}", e)))?;
        if raw.len() < NONCE_SIZE {
            return Err(AppError::Crypto("ciphertext too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| AppError::Crypto(format!("decryption failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::Crypto(format!("decrypted data is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> TokenCipher {
        TokenCipher::new(&"ab".repeat(32)).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt("ghp_sometoken123").unwrap();
        assert_ne!(encrypted, "ghp_sometoken123");
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "ghp_sometoken123");
    }

    #[test]
    fn test_empty_is_noop() {
        let cipher = test_cipher();
        assert_eq!(cipher.encrypt("").unwrap(), "");
        assert_eq!(cipher.decrypt("").unwrap(), "");
    }

    #[test]
    fn test_nonce_uniqueness() {
        let cipher = test_cipher();
        let a = cipher.encrypt("same input").unwrap();
        let b = cipher.encrypt("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(TokenCipher::new("deadbeef").is_err());
        assert!(TokenCipher::new("not hex at all").is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = test_cipher();
        let mut encrypted = cipher.encrypt("secret").unwrap();
        encrypted.replace_range(encrypted.len() - 2.., "00");
        assert!(cipher.decrypt(&encrypted).is_err());
    }
}
