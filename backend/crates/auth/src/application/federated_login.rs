//! Federated Login
//!
//! Redirect-based sign-in: `begin` hands out the provider URL plus a random
//! `state`; `complete` trades the callback code for a profile, runs the
//! verifier and opens a session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_store::{IssuedSession, SessionStore};
use crate::application::verify_identity::{Denial, IdentityVerifier, Verification};
use crate::domain::entity::identity::Identity;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{IdentityRepository, SessionRepository};
use crate::error::{AuthError, AuthResult};

/// Bytes of entropy in the OAuth `state`
const STATE_BYTES: usize = 24;

#[derive(Debug, Clone)]
pub struct LoginStart {
    pub authorize_url: String,
    pub state: String,
}

#[derive(Debug)]
pub enum LoginOutcome {
    SignedIn {
        identity: Identity,
        session: IssuedSession,
    },
    Denied(Denial),
}

pub struct FederatedLoginUseCase<R, P>
where
    R: IdentityRepository + SessionRepository,
    P: IdentityProvider,
{
    repo: Arc<R>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<R, P> FederatedLoginUseCase<R, P>
where
    R: IdentityRepository + SessionRepository,
    P: IdentityProvider,
{
    pub fn new(repo: Arc<R>, provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            provider,
            config,
        }
    }

    pub fn begin(&self) -> AuthResult<LoginStart> {
        let state = platform::crypto::random_token(STATE_BYTES);
        let authorize_url = self.provider.authorize_url(&state)?;
        Ok(LoginStart {
            authorize_url,
            state,
        })
    }

    /// `expected_state` is what the state cookie held; `returned_state` is
    /// what came back on the callback URL.
    pub async fn complete(
        &self,
        code: &str,
        returned_state: &str,
        expected_state: Option<&str>,
    ) -> AuthResult<LoginOutcome> {
        let state_ok = expected_state.is_some_and(|expected| {
            platform::crypto::constant_time_eq(expected.as_bytes(), returned_state.as_bytes())
        });
        if !state_ok || returned_state.is_empty() {
            return Err(AuthError::InvalidOAuthState);
        }

        let profile = self.provider.exchange_code(code).await?;

        let verifier = IdentityVerifier::new(self.repo.clone(), self.config.clone());
        match verifier.verify(&profile).await? {
            Verification::Denied(denial) => Ok(LoginOutcome::Denied(denial)),
            Verification::Allowed(identity) => {
                let sessions = SessionStore::new(self.repo.clone(), self.config.clone());
                let session = sessions.create(&identity).await?;
                Ok(LoginOutcome::SignedIn { identity, session })
            }
        }
    }
}
