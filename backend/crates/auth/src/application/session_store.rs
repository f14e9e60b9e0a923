//! Session Store
//!
//! Maps opaque session tokens to sessions. A token is
//! `<session uuid>.<base64url HMAC-SHA256(uuid)>`, so tampered tokens are
//! rejected before the repository is touched.
//!
//! Expiry is lazy: `lookup` treats `now >= expires_at` as invalid and drops
//! the row. `sweep_expired` reclaims whatever lazy expiry never saw.

use chrono::Utc;
use kernel::id::SessionId;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, identity::Identity};
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Why a token did not resolve to a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSession {
    /// Not `uuid.signature`, or the signature does not verify
    Malformed,
    /// Well-formed but no such session (logged out, swept, never existed)
    Unknown,
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionLookup {
    Valid(AuthSession),
    Invalid(InvalidSession),
}

/// A freshly created session and the credential to hand to the client
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: AuthSession,
}

pub struct SessionStore<S>
where
    S: SessionRepository,
{
    repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionStore<S>
where
    S: SessionRepository,
{
    pub fn new(repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn create(&self, identity: &Identity) -> AuthResult<IssuedSession> {
        let session = AuthSession::new(
            identity.identity_id,
            Utc::now(),
            self.config.session_ttl,
            self.config.session_max_lifetime,
        );
        self.repo.create_session(&session).await?;

        tracing::info!(
            identity_id = %identity.identity_id,
            session_id = %session.session_id,
            "Session created"
        );

        Ok(IssuedSession {
            token: sign_token(&session.session_id, &self.config.session_secret),
            session,
        })
    }

    pub async fn lookup(&self, token: &str) -> AuthResult<SessionLookup> {
        let Some(session_id) = verify_token(token, &self.config.session_secret) else {
            return Ok(SessionLookup::Invalid(InvalidSession::Malformed));
        };

        let Some(session) = self.repo.find_session(&session_id).await? else {
            return Ok(SessionLookup::Invalid(InvalidSession::Unknown));
        };

        if !session.is_valid_at(Utc::now()) {
            if let Err(e) = self.repo.delete_session(&session_id).await {
                tracing::warn!(error = %e, session_id = %session_id, "Failed to drop expired session");
            }
            return Ok(SessionLookup::Invalid(InvalidSession::Expired));
        }

        Ok(SessionLookup::Valid(session))
    }

    /// Record activity on a live session, extending expiry when rolling
    /// sessions are enabled. Concurrent refreshes are last-write-wins.
    pub async fn refresh(&self, session: &mut AuthSession) -> AuthResult<()> {
        if !self.config.rolling_sessions {
            return Ok(());
        }
        session.touch(
            Utc::now(),
            self.config.session_ttl,
            self.config.session_max_lifetime,
        );
        self.repo.update_session(session).await
    }

    /// `lookup` followed by `refresh`
    pub async fn touch(&self, token: &str) -> AuthResult<SessionLookup> {
        match self.lookup(token).await? {
            SessionLookup::Valid(mut session) => {
                self.refresh(&mut session).await?;
                Ok(SessionLookup::Valid(session))
            }
            invalid => Ok(invalid),
        }
    }

    /// Remove the session behind `token`. Unparseable tokens are a no-op.
    pub async fn invalidate(&self, token: &str) -> AuthResult<()> {
        if let Some(session_id) = verify_token(token, &self.config.session_secret) {
            self.repo.delete_session(&session_id).await?;
            tracing::info!(session_id = %session_id, "Session invalidated");
        }
        Ok(())
    }

    pub async fn sweep_expired(&self) -> AuthResult<u64> {
        let deleted = self
            .repo
            .delete_expired_sessions(Utc::now().timestamp_millis())
            .await?;
        if deleted > 0 {
            tracing::info!(sessions_deleted = deleted, "Swept expired sessions");
        }
        Ok(deleted)
    }
}

/// `uuid.base64url(hmac(uuid))`
pub fn sign_token(session_id: &SessionId, secret: &[u8; 32]) -> String {
    let id = session_id.to_string();
    let tag = platform::crypto::hmac_sha256(secret, id.as_bytes());
    format!("{}.{}", id, platform::crypto::to_base64_url(&tag))
}

/// Session id from a token whose signature checks out
pub fn verify_token(token: &str, secret: &[u8; 32]) -> Option<SessionId> {
    let (id, signature) = token.split_once('.')?;
    let tag = platform::crypto::from_base64_url(signature).ok()?;
    if !platform::crypto::verify_hmac_sha256(secret, id.as_bytes(), &tag) {
        return None;
    }
    id.parse().ok()
}
