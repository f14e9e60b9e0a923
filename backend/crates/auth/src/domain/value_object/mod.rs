//! Value Object Module

pub mod allowed_domain;
pub mod email;
pub mod identity_query;
pub mod provider_profile;

pub use allowed_domain::AllowedDomain;
pub use email::{Email, EmailError};
pub use identity_query::{IdentityQuery, IdentitySort, SortOrder};
pub use provider_profile::ProviderProfile;
