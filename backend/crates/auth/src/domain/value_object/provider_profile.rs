//! Provider Profile
//!
//! What the federated identity provider tells us about the person who just
//! signed in. Nothing here is trusted until the verifier has checked it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Stable subject id issued by the provider
    pub subject_id: String,
    /// Primary email as reported by the provider (unvalidated)
    pub email: String,
    pub display_name: String,
    pub picture: Option<String>,
    /// Whether the provider has confirmed the person controls `email`
    pub email_verified: bool,
}
