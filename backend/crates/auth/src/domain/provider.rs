//! Federated identity provider port

use crate::domain::value_object::provider_profile::ProviderProfile;
use crate::error::AuthResult;

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Where to send the browser to start a login carrying `state`
    fn authorize_url(&self, state: &str) -> AuthResult<String>;

    /// Trade the callback `code` for the signed-in user's profile.
    /// Transport or protocol failures are `ProviderUnavailable`.
    async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile>;
}
