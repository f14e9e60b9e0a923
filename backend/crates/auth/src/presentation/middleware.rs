//! Auth Middleware
//!
//! Axum adapters over [`AccessGate`]. On Allow the caller's identity is
//! stored in request extensions as [`CurrentIdentity`]; on Deny the request
//! never reaches the handler.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use std::sync::Arc;

use crate::application::access_gate::{
    AccessGate, CookieCredential, CredentialExtractor, GateDecision,
};
use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, identity::Identity};
use crate::domain::repository::AuthStore;
use crate::error::AuthError;

/// Identity of the authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

/// Middleware state
pub struct GateState<R>
where
    R: AuthStore,
{
    pub gate: Arc<AccessGate<R>>,
    pub extractor: Arc<dyn CredentialExtractor>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for GateState<R>
where
    R: AuthStore,
{
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            extractor: self.extractor.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> GateState<R>
where
    R: AuthStore,
{
    /// Gate reading the session cookie named in `config`
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        let extractor = Arc::new(CookieCredential::new(&config.session_cookie_name));
        Self::with_extractor(repo, config, extractor)
    }

    pub fn with_extractor(
        repo: Arc<R>,
        config: Arc<AuthConfig>,
        extractor: Arc<dyn CredentialExtractor>,
    ) -> Self {
        Self {
            gate: Arc::new(AccessGate::new(repo, config.clone())),
            extractor,
            config,
        }
    }
}

/// Middleware that requires a valid session
pub async fn require_session<R>(
    State(state): State<GateState<R>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AuthStore,
{
    guard(state, false, req, next).await
}

/// Middleware that requires a valid session owned by the allowed domain
pub async fn require_member<R>(
    State(state): State<GateState<R>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AuthStore,
{
    guard(state, true, req, next).await
}

async fn guard<R>(
    state: GateState<R>,
    member: bool,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AuthStore,
{
    let credential = state.extractor.extract(req.headers());

    let decision = if member {
        state.gate.authorize_member(credential.as_deref()).await?
    } else {
        state.gate.authorize(credential.as_deref()).await?
    };

    let principal = match decision {
        GateDecision::Allow(principal) => principal,
        GateDecision::Deny(reason) => {
            tracing::debug!(?reason, path = %req.uri().path(), "Request denied by access gate");
            return Err(reason.into_error());
        }
    };

    let rolled = credential
        .filter(|_| state.config.rolling_sessions)
        .map(|token| session_cookie_header(&state.config, &token, &principal.session));
    req.extensions_mut()
        .insert(CurrentIdentity(principal.identity));

    let mut response = next.run(req).await;

    if let Some(cookie) = rolled {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    Ok(response)
}

/// Session cookie whose Max-Age matches the session's current deadline,
/// rounded up to whole seconds
pub(crate) fn session_cookie_header(
    config: &AuthConfig,
    token: &str,
    session: &AuthSession,
) -> HeaderValue {
    let max_age = (session.remaining_ms(Utc::now()) + 999) / 1000;
    platform::cookie::set_cookie_header(&config.session_cookie().with_max_age(max_age), token)
}
