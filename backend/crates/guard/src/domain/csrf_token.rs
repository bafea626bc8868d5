//! CSRF Token
//!
//! Self-contained double-submit token: `<value>.<signature>` where `value` is
//! 32 random bytes (unpadded base64url) and `signature` is
//! `platform::crypto::sign(value)`. Nothing is stored server-side; a token is
//! valid iff its signature re-derives under the active secret.

use platform::crypto::{self, SigningSecret};

/// Random bytes in a freshly minted value
pub const VALUE_BYTES: usize = 32;

/// Minimum entropy accepted on read (128 bits)
const MIN_VALUE_BYTES: usize = 16;

/// Longest encoded token accepted on read
const MAX_ENCODED_LEN: usize = 256;

/// CSRF token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
    value: String,
    signature: String,
}

impl CsrfToken {
    /// Mint a new token under `secret`
    pub fn mint(secret: &SigningSecret) -> Self {
        let value = crypto::random_token(VALUE_BYTES);
        let signature = crypto::sign(&value, secret);
        Self { value, signature }
    }

    /// Split an encoded token; shape only, no crypto
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.len() > MAX_ENCODED_LEN {
            return None;
        }
        let (value, signature) = raw.split_once('.')?;
        if !is_base64url(value) || !is_base64url(signature) {
            return None;
        }
        Some(Self {
            value: value.to_string(),
            signature: signature.to_string(),
        })
    }

    /// Whether the signature re-derives from the value under `secret`
    pub fn verify(&self, secret: &SigningSecret) -> bool {
        let long_enough = crypto::from_base64url(&self.value)
            .is_ok_and(|bytes| bytes.len() >= MIN_VALUE_BYTES);
        long_enough && crypto::verify(&self.value, &self.signature, secret)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Encoded form used in both the cookie and the header
    pub fn encode(&self) -> String {
        format!("{}.{}", self.value, self.signature)
    }
}

fn is_base64url(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
