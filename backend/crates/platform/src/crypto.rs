//! Cryptographic Utilities
//!
//! The signing primitive shared by CSRF tokens and session tokens:
//! `sign` produces an unpadded base64url HMAC-SHA256, `verify` recomputes it
//! and compares in constant time. A mismatch is a `false`, never an error.

use std::fmt;

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted length of a signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Error when building a [`SigningSecret`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("Signing secret is not configured")]
    Missing,

    #[error("Signing secret is too short ({len} bytes, minimum {MIN_SECRET_LEN})")]
    TooShort { len: usize },
}

/// HMAC key with an enforced minimum length
///
/// The bytes are wiped on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret {
    bytes: Vec<u8>,
}

impl SigningSecret {
    /// Build a secret, rejecting anything shorter than [`MIN_SECRET_LEN`]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SecretError::Missing);
        }
        if bytes.len() < MIN_SECRET_LEN {
            return Err(SecretError::TooShort { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    /// Build a secret from an optional environment value
    pub fn from_env_value(value: Option<&str>) -> Result<Self, SecretError> {
        match value {
            Some(raw) => Self::new(raw.as_bytes()),
            None => Err(SecretError::Missing),
        }
    }

    /// Random secret for development and build-phase processes
    pub fn random() -> Self {
        Self {
            bytes: random_bytes(MIN_SECRET_LEN),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random value encoded as unpadded base64url
pub fn random_token(len: usize) -> String {
    to_base64url(&random_bytes(len))
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode bytes as standard base64 (padded)
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Encode bytes as unpadded base64url
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Sign `value`: base64url (no padding) of HMAC-SHA256 under `secret`
pub fn sign(value: &str, secret: &SigningSecret) -> String {
    to_base64url(&hmac_sha256(secret.as_bytes(), value.as_bytes()))
}

/// Verify a signature produced by [`sign`]
///
/// Malformed signatures and mismatches both yield `false`.
pub fn verify(value: &str, signature: &str, secret: &SigningSecret) -> bool {
    let Ok(provided) = from_base64url(signature) else {
        return false;
    };

    let expected = hmac_sha256(secret.as_bytes(), value.as_bytes());
    constant_time_eq(&provided, &expected)
}

/// Constant-time comparison to prevent timing attacks
///
/// Only the length is allowed to leak.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
