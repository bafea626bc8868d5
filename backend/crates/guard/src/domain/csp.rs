//! Content Security Policy
//!
//! The policy is an ordered list of `(directive, value)` pairs so the header
//! is byte-for-byte deterministic for a given nonce and environment.

use std::fmt;

use platform::crypto;

/// Random bytes in a script nonce
const NONCE_BYTES: usize = 16;

/// Hardening headers sent with every page response
pub const HARDENING_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "camera=(), microphone=(), geolocation=()"),
];

/// Per-request script nonce (standard base64), also exposed to handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspNonce(String);

impl CspNonce {
    pub fn generate() -> Self {
        Self(crypto::to_base64(&crypto::random_bytes(NONCE_BYTES)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered CSP directive list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspPolicy {
    directives: Vec<(&'static str, String)>,
}

impl CspPolicy {
    /// Page policy for one request
    pub fn for_page(nonce: &CspNonce, production: bool) -> Self {
        let mut directives = vec![
            ("default-src", "'self'".to_string()),
            (
                "script-src",
                format!("'self' 'nonce-{}' 'strict-dynamic'", nonce.as_str()),
            ),
            ("style-src", "'self' 'unsafe-inline'".to_string()),
            ("img-src", "'self' data: blob:".to_string()),
            ("font-src", "'self'".to_string()),
            ("connect-src", "'self'".to_string()),
            ("object-src", "'none'".to_string()),
            ("base-uri", "'self'".to_string()),
            ("form-action", "'self'".to_string()),
            ("frame-ancestors", "'none'".to_string()),
        ];
        if production {
            directives.push(("upgrade-insecure-requests", String::new()));
        }
        Self { directives }
    }

    pub fn directives(&self) -> &[(&'static str, String)] {
        &self.directives
    }

    /// Header value: directives joined by `; `
    pub fn to_header_value(&self) -> String {
        self.directives
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    (*name).to_string()
                } else {
                    format!("{name} {value}")
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
