//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations for the security pipeline:
//! - Signing primitive (HMAC-SHA256, base64url, constant-time verify)
//! - Proxy-trust-aware client IP resolution
//! - Cookie management
//! - Rate limiting abstractions (store trait, sliding-window math)
//! - Environment configuration helpers

pub mod client;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod rate_limit;
