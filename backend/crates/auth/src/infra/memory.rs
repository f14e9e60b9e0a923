//! In-Memory Repository Implementations
//!
//! Process-local stores with the same semantics as the PostgreSQL ones.
//! Used by tests and by the server when no database is configured.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{IdentityId, SessionId};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::entity::{auth_session::AuthSession, identity::Identity};
use crate::domain::repository::{DailyCount, IdentityPage, IdentityRepository, SessionRepository};
use crate::domain::value_object::identity_query::{IdentityQuery, IdentitySort, SortOrder};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Default)]
pub struct MemoryAuthRepository {
    identities: Arc<RwLock<HashMap<IdentityId, Identity>>>,
    sessions: Arc<RwLock<HashMap<SessionId, AuthSession>>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    fn count_where(&self, pred: impl Fn(&Identity) -> bool) -> u64 {
        self.identities.read().values().filter(|i| pred(i)).count() as u64
    }
}

fn compare(a: &Identity, b: &Identity, sort: IdentitySort) -> Ordering {
    match sort {
        IdentitySort::Name => a.display_name.cmp(&b.display_name),
        IdentitySort::Email => a.email.as_str().cmp(b.email.as_str()),
        IdentitySort::CreatedAt => a.created_at.cmp(&b.created_at),
        IdentitySort::LastLogin => a.last_login_at.cmp(&b.last_login_at),
    }
}

impl IdentityRepository for MemoryAuthRepository {
    async fn find_identity(&self, identity_id: &IdentityId) -> AuthResult<Option<Identity>> {
        Ok(self.identities.read().get(identity_id).cloned())
    }

    async fn find_identity_by_subject(&self, subject_id: &str) -> AuthResult<Option<Identity>> {
        Ok(self
            .identities
            .read()
            .values()
            .find(|i| i.subject_id == subject_id)
            .cloned())
    }

    async fn create_identity(&self, identity: &Identity) -> AuthResult<()> {
        let mut identities = self.identities.write();
        let taken = identities
            .values()
            .any(|i| i.subject_id == identity.subject_id || i.email == identity.email);
        if taken {
            return Err(AuthError::IdentityConflict);
        }
        identities.insert(identity.identity_id, identity.clone());
        Ok(())
    }

    async fn record_login(&self, identity_id: &IdentityId, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(identity) = self.identities.write().get_mut(identity_id) {
            identity.record_login(at);
        }
        Ok(())
    }

    async fn count_identities(&self) -> AuthResult<u64> {
        Ok(self.identities.read().len() as u64)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> AuthResult<u64> {
        Ok(self.count_where(|i| i.created_at >= since))
    }

    async fn count_logged_in_since(&self, since: DateTime<Utc>) -> AuthResult<u64> {
        Ok(self.count_where(|i| i.last_login_at >= since))
    }

    async fn registration_trend(&self, since: DateTime<Utc>) -> AuthResult<Vec<DailyCount>> {
        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for identity in self.identities.read().values() {
            if identity.created_at >= since {
                *days.entry(identity.created_at.date_naive()).or_default() += 1;
            }
        }
        Ok(days
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect())
    }

    async fn list_identities(&self, query: &IdentityQuery) -> AuthResult<IdentityPage> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<Identity> = self
            .identities
            .read()
            .values()
            .filter(|i| match &needle {
                Some(n) => {
                    i.display_name.to_lowercase().contains(n) || i.email.as_str().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(IdentityPage { items, total })
    }

    async fn recent_logins(&self, limit: u32) -> AuthResult<Vec<Identity>> {
        let mut all: Vec<Identity> = self.identities.read().values().cloned().collect();
        all.sort_by(|a, b| b.last_login_at.cmp(&a.last_login_at));
        all.truncate(limit as usize);
        Ok(all)
    }
}

impl SessionRepository for MemoryAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        self.sessions
            .write()
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &SessionId) -> AuthResult<Option<AuthSession>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn update_session(&self, session: &AuthSession) -> AuthResult<()> {
        if let Some(stored) = self.sessions.write().get_mut(&session.session_id) {
            stored.expires_at_ms = session.expires_at_ms;
            stored.last_seen_at = session.last_seen_at;
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: &SessionId) -> AuthResult<()> {
        self.sessions.write().remove(session_id);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now_ms: i64) -> AuthResult<u64> {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at_ms > now_ms);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{email::Email, provider_profile::ProviderProfile};

    fn identity(name: &str, email: &str) -> Identity {
        let profile = ProviderProfile {
            subject_id: email.into(),
            email: email.into(),
            display_name: name.into(),
            picture: None,
            email_verified: true,
        };
        Identity::new(&profile, Email::new(email).unwrap(), Utc::now())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = MemoryAuthRepository::new();
        let a = identity("A", "a@bmsce.ac.in");
        repo.create_identity(&a).await.unwrap();

        let mut b = identity("B", "a@bmsce.ac.in");
        b.subject_id = "other".into();
        assert!(matches!(
            repo.create_identity(&b).await,
            Err(AuthError::IdentityConflict)
        ));
    }

    #[tokio::test]
    async fn test_list_search_sort_and_page() {
        let repo = MemoryAuthRepository::new();
        for (name, email) in [
            ("Charan", "charan@bmsce.ac.in"),
            ("Anika", "anika@bmsce.ac.in"),
            ("Bharath", "bharath@bmsce.ac.in"),
            ("Zoya", "zoya@bmsce.ac.in"),
        ] {
            repo.create_identity(&identity(name, email)).await.unwrap();
        }

        let page = repo
            .list_identities(&IdentityQuery {
                page: 1,
                limit: 2,
                sort_by: IdentitySort::Name,
                order: SortOrder::Asc,
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        let names: Vec<_> = page.items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, ["Anika", "Bharath"]);

        let page = repo
            .list_identities(&IdentityQuery {
                search: Some("AR".into()),
                sort_by: IdentitySort::Email,
                order: SortOrder::Desc,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = page.items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, ["Charan", "Bharath"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_delete_expired_sessions() {
        let repo = MemoryAuthRepository::new();
        let now = Utc::now();
        let minute = std::time::Duration::from_secs(60);
        let live = AuthSession::new(IdentityId::new(), now, minute, None);
        let mut dead = AuthSession::new(IdentityId::new(), now, minute, None);
        dead.expires_at_ms = now.timestamp_millis();
        repo.create_session(&live).await.unwrap();
        repo.create_session(&dead).await.unwrap();

        assert_eq!(
            repo.delete_expired_sessions(now.timestamp_millis()).await.unwrap(),
            1
        );
        assert_eq!(repo.session_count(), 1);
    }
}
