//! Application Layer
//!
//! Use cases and application services.

pub mod access_gate;
pub mod analytics;
pub mod config;
pub mod federated_login;
pub mod session_store;
pub mod verify_identity;

// Re-exports
pub use access_gate::{
    AccessGate, CookieCredential, CredentialExtractor, DenyReason, GateDecision, Principal,
};
pub use analytics::{Activity, AnalyticsUseCase, IdentityQueryInput, Overview};
pub use config::{AuthConfig, OAuthConfig};
pub use federated_login::{FederatedLoginUseCase, LoginOutcome, LoginStart};
pub use session_store::{InvalidSession, IssuedSession, SessionLookup, SessionStore};
pub use verify_identity::{Denial, IdentityVerifier, Verification};
