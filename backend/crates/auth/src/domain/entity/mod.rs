//! Entity Module

pub mod auth_session;
pub mod identity;

pub use auth_session::AuthSession;
pub use identity::Identity;
