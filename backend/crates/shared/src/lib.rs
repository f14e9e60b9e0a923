//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types, stable error codes and result aliases
//! - Field-level validation errors
//! - Typed ID wrappers shared by the catalog and auth domains
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod code;
    pub mod conversions;
    pub mod field;
    pub mod kind;
    pub mod problem;
}
pub mod id;
