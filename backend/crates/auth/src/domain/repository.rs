//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.
//! Method names are unique across traits so one type can implement both
//! without ambiguous calls in generic code.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{IdentityId, SessionId};
use serde::Serialize;

use crate::domain::entity::{auth_session::AuthSession, identity::Identity};
use crate::domain::value_object::identity_query::IdentityQuery;
use crate::error::AuthResult;

/// Registrations on one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// One page of identities plus the total matching the search
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityPage {
    pub items: Vec<Identity>,
    pub total: u64,
}

/// Identity repository trait
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    async fn find_identity(&self, identity_id: &IdentityId) -> AuthResult<Option<Identity>>;

    async fn find_identity_by_subject(&self, subject_id: &str) -> AuthResult<Option<Identity>>;

    /// Insert a new identity. A duplicate email or subject is `IdentityConflict`.
    async fn create_identity(&self, identity: &Identity) -> AuthResult<()>;

    /// Move `last_login_at`; nothing else about the identity is writable
    async fn record_login(&self, identity_id: &IdentityId, at: DateTime<Utc>) -> AuthResult<()>;

    async fn count_identities(&self) -> AuthResult<u64>;

    async fn count_created_since(&self, since: DateTime<Utc>) -> AuthResult<u64>;

    async fn count_logged_in_since(&self, since: DateTime<Utc>) -> AuthResult<u64>;

    /// Per-day registrations since `since`, ascending, days without signups omitted
    async fn registration_trend(&self, since: DateTime<Utc>) -> AuthResult<Vec<DailyCount>>;

    async fn list_identities(&self, query: &IdentityQuery) -> AuthResult<IdentityPage>;

    /// Most recent logins first
    async fn recent_logins(&self, limit: u32) -> AuthResult<Vec<Identity>>;
}

/// Auth session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()>;

    async fn find_session(&self, session_id: &SessionId) -> AuthResult<Option<AuthSession>>;

    /// Persist `expires_at_ms` and `last_seen_at`. Last write wins.
    async fn update_session(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete_session(&self, session_id: &SessionId) -> AuthResult<()>;

    /// Remove sessions whose expiry is at or before `now_ms`
    async fn delete_expired_sessions(&self, now_ms: i64) -> AuthResult<u64>;
}

/// Everything the auth HTTP layer needs from one backing store
pub trait AuthStore: IdentityRepository + SessionRepository + Send + Sync + 'static {}

impl<T> AuthStore for T where T: IdentityRepository + SessionRepository + Send + Sync + 'static {}
