//! Domain Layer
//!
//! Contains entities, value objects, and the repository / provider traits.

pub mod entity;
pub mod provider;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{auth_session::AuthSession, identity::Identity};
pub use provider::IdentityProvider;
pub use repository::{AuthStore, IdentityRepository, SessionRepository};
