//! Reversible encryption for values the session keeps in cookies: the username
//! copy inside the token info and the remember-me record. The session treats
//! the cipher as opaque through [`Encryptor`]; [`AesEncryptor`] is the default.

use crate::errors::AuthError;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit};
use base64ct::{Base64, Encoding};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Turns plaintext into a printable encrypted string and back.
pub trait Encryptor: Send + Sync {
    /// # Errors
    /// Returns [`AuthError::Crypto`] if encryption fails.
    fn encrypt(&self, plaintext: &[u8]) -> Result<String, AuthError>;

    /// # Errors
    /// Returns [`AuthError::Crypto`] if the ciphertext is malformed or was not
    /// produced with this key.
    fn decrypt(&self, ciphertext: &str) -> Result<Vec<u8>, AuthError>;
}

/// Encrypts a plain string.
///
/// # Errors
/// Returns [`AuthError::Crypto`] if encryption fails.
pub fn encrypt_text(encryptor: &dyn Encryptor, text: &str) -> Result<String, AuthError> {
    encryptor.encrypt(text.as_bytes())
}

/// Encrypts a structured record as one opaque blob (JSON first).
///
/// # Errors
/// Returns [`AuthError::Serialization`] if the record cannot be encoded, or
/// [`AuthError::Crypto`] if encryption fails.
pub fn encrypt_record<T: Serialize>(
    encryptor: &dyn Encryptor,
    record: &T,
) -> Result<String, AuthError> {
    let json = serde_json::to_vec(record)
        .map_err(|err| AuthError::Serialization(format!("Failed to encode record: {err}")))?;
    encryptor.encrypt(&json)
}

/// Reverses [`encrypt_record`].
///
/// # Errors
/// Returns [`AuthError::Crypto`] if decryption fails, or [`AuthError::Parse`]
/// if the plaintext is not the expected record.
pub fn decrypt_record<T: DeserializeOwned>(
    encryptor: &dyn Encryptor,
    ciphertext: &str,
) -> Result<T, AuthError> {
    let plaintext = encryptor.decrypt(ciphertext)?;
    serde_json::from_slice(&plaintext)
        .map_err(|err| AuthError::Parse(format!("Failed to decode record: {err}")))
}

/// AES-256-GCM with a random nonce per message.
/// Output is `base64(nonce (12 bytes) || ciphertext)`.
pub struct AesEncryptor {
    key: [u8; KEY_LEN],
}

impl AesEncryptor {
    #[must_use]
    pub const fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Loads a key given as standard base64 of 32 bytes.
    ///
    /// # Errors
    /// Returns [`AuthError::Config`] if the key is not valid base64 or has the
    /// wrong length.
    pub fn from_base64(encoded: &SecretString) -> Result<Self, AuthError> {
        let bytes = Base64::decode_vec(encoded.expose_secret().trim())
            .map_err(|_| AuthError::Config("Encryption key is not valid base64.".to_string()))?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            AuthError::Config(format!("Encryption key must be {KEY_LEN} bytes."))
        })?;
        Ok(Self { key })
    }

    /// Generates a random key and returns it base64 encoded.
    #[must_use]
    pub fn generate_key() -> SecretString {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        SecretString::from(Base64::encode_string(&key))
    }
}

impl Encryptor for AesEncryptor {
    fn encrypt(&self, plaintext: &[u8]) -> Result<String, AuthError> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = GenericArray::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| AuthError::Crypto(format!("Encryption failed: {e}")))?;

        let mut result = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(Base64::encode_string(&result))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<Vec<u8>, AuthError> {
        let data = Base64::decode_vec(ciphertext.trim())
            .map_err(|_| AuthError::Crypto("Ciphertext is not valid base64".to_string()))?;
        if data.len() < NONCE_LEN {
            return Err(AuthError::Crypto("Ciphertext too short".to_string()));
        }

        let (nonce_bytes, sealed) = data.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));

        cipher
            .decrypt(GenericArray::from_slice(nonce_bytes), sealed)
            .map_err(|e| AuthError::Crypto(format!("Decryption failed: {e}")))
    }
}
