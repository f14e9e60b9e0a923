//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256, HMAC, Base64)
//! - Cookie management
//! - Bounded-freshness in-memory listing cache
//! - Retry policies with backoff and cancellation

pub mod cache;
pub mod cookie;
pub mod crypto;
pub mod retry;
