//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and provider traits
//! - `application/` - Use cases (verifier, session store, access gate, analytics)
//! - `infra/` - PostgreSQL, in-memory and Google implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Federated sign-in through Google, restricted to one allowed email domain
//! - Server-side sessions with HMAC-signed cookie tokens and rolling expiry
//! - Access gate middleware with a typed Allow / Deny decision
//! - Read-only identity analytics (overview, activity, paged listing)
//!
//! ## Security Model
//! - The domain check runs at login and again on member-only routes
//! - Session tokens are `uuid.signature`; forged or truncated tokens never hit the store
//! - A missing or expired session yields 401 `LOGIN_REQUIRED`, never a 5xx

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, OAuthConfig};
pub use error::{AuthError, AuthResult};
pub use infra::google::GoogleIdentityProvider;
pub use infra::memory::MemoryAuthRepository;
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{CurrentIdentity, GateState};
pub use presentation::router::{analytics_router, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
