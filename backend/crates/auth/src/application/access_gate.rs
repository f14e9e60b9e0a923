//! Access Gate
//!
//! Resolves a request credential into a typed decision. The HTTP middleware
//! in `presentation::middleware` is a thin adapter over [`AccessGate`].

use axum::http::HeaderMap;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_store::{InvalidSession, SessionLookup, SessionStore};
use crate::domain::entity::{auth_session::AuthSession, identity::Identity};
use crate::domain::repository::{IdentityRepository, SessionRepository};
use crate::error::{AuthError, AuthResult};

/// Pulls the raw session credential out of a request
pub trait CredentialExtractor: Send + Sync {
    fn extract(&self, headers: &HeaderMap) -> Option<String>;
}

/// Credential carried in a named cookie
#[derive(Debug, Clone)]
pub struct CookieCredential {
    name: String,
}

impl CookieCredential {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CredentialExtractor for CookieCredential {
    fn extract(&self, headers: &HeaderMap) -> Option<String> {
        platform::cookie::extract_cookie(headers, &self.name)
    }
}

/// The authenticated caller, attached to the request on Allow
#[derive(Debug, Clone)]
pub struct Principal {
    pub identity: Identity,
    pub session: AuthSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingCredential,
    InvalidSession(InvalidSession),
    /// Session is fine, identity is outside the allowed domain
    DomainNotAllowed,
}

impl DenyReason {
    pub fn into_error(self) -> AuthError {
        match self {
            DenyReason::DomainNotAllowed => AuthError::DomainForbidden,
            DenyReason::MissingCredential | DenyReason::InvalidSession(_) => {
                AuthError::LoginRequired
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum GateDecision {
    Allow(Principal),
    Deny(DenyReason),
}

pub struct AccessGate<R>
where
    R: IdentityRepository + SessionRepository,
{
    repo: Arc<R>,
    sessions: SessionStore<R>,
    config: Arc<AuthConfig>,
}

impl<R> AccessGate<R>
where
    R: IdentityRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            sessions: SessionStore::new(repo.clone(), config.clone()),
            repo,
            config,
        }
    }

    /// Requires a live session. Store failures are `Err`, never a Deny.
    pub async fn authorize(&self, credential: Option<&str>) -> AuthResult<GateDecision> {
        let Some(token) = credential else {
            return Ok(GateDecision::Deny(DenyReason::MissingCredential));
        };

        let mut session = match self.sessions.lookup(token).await? {
            SessionLookup::Valid(session) => session,
            SessionLookup::Invalid(reason) => {
                tracing::debug!(?reason, "Session rejected");
                return Ok(GateDecision::Deny(DenyReason::InvalidSession(reason)));
            }
        };

        let Some(identity) = self.repo.find_identity(&session.identity_id).await? else {
            tracing::warn!(session_id = %session.session_id, "Session without identity, dropping");
            self.sessions.invalidate(token).await?;
            return Ok(GateDecision::Deny(DenyReason::InvalidSession(
                InvalidSession::Unknown,
            )));
        };

        // Failing to extend only shortens the timeout; the request stays authorized
        if let Err(e) = self.sessions.refresh(&mut session).await {
            tracing::warn!(error = %e, session_id = %session.session_id, "Failed to extend session");
        }

        Ok(GateDecision::Allow(Principal { identity, session }))
    }

    /// `authorize` plus a request-time allowed-domain check
    pub async fn authorize_member(&self, credential: Option<&str>) -> AuthResult<GateDecision> {
        match self.authorize(credential).await? {
            GateDecision::Allow(principal)
                if !self.config.allowed_domain().permits(&principal.identity.email) =>
            {
                tracing::warn!(
                    identity_id = %principal.identity.identity_id,
                    "Identity outside allowed domain"
                );
                Ok(GateDecision::Deny(DenyReason::DomainNotAllowed))
            }
            decision => Ok(decision),
        }
    }
}
