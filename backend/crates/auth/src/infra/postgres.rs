//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{IdentityId, SessionId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{auth_session::AuthSession, identity::Identity};
use crate::domain::repository::{DailyCount, IdentityPage, IdentityRepository, SessionRepository};
use crate::domain::value_object::{email::Email, identity_query::IdentityQuery};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const IDENTITY_COLUMNS: &str =
    "identity_id, subject_id, email, display_name, picture, created_at, last_login_at";

/// Escape LIKE wildcards so search text matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for PgAuthRepository {
    async fn find_identity(&self, identity_id: &IdentityId) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE identity_id = $1"
        ))
        .bind(identity_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(IdentityRow::into_identity))
    }

    async fn find_identity_by_subject(&self, subject_id: &str) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE subject_id = $1"
        ))
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(IdentityRow::into_identity))
    }

    async fn create_identity(&self, identity: &Identity) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (
                identity_id,
                subject_id,
                email,
                display_name,
                picture,
                created_at,
                last_login_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(identity.identity_id.as_uuid())
        .bind(&identity.subject_id)
        .bind(identity.email.as_str())
        .bind(&identity.display_name)
        .bind(&identity.picture)
        .bind(identity.created_at)
        .bind(identity.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::IdentityConflict
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn record_login(&self, identity_id: &IdentityId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE identities SET last_login_at = $2 WHERE identity_id = $1")
            .bind(identity_id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn count_identities(&self) -> AuthResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> AuthResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_logged_in_since(&self, since: DateTime<Utc>) -> AuthResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE last_login_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn registration_trend(&self, since: DateTime<Utc>) -> AuthResult<Vec<DailyCount>> {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*)
            FROM identities
            WHERE created_at >= $1
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, count)| DailyCount {
                date,
                count: count as u64,
            })
            .collect())
    }

    async fn list_identities(&self, query: &IdentityQuery) -> AuthResult<IdentityPage> {
        let pattern = query.search.as_deref().map(like_pattern);
        // $1 NULL disables the filter
        let filter = "($1::text IS NULL OR display_name ILIKE $1 OR email ILIKE $1)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM identities WHERE {filter}"))
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        // Sort column and direction come from closed enums
        let sql = format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE {filter} \
             ORDER BY {} {}, identity_id LIMIT $2 OFFSET $3",
            query.sort_by.column(),
            query.order.sql(),
        );
        let rows = sqlx::query_as::<_, IdentityRow>(&sql)
            .bind(&pattern)
            .bind(i64::from(query.limit))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(IdentityPage {
            items: rows.into_iter().map(IdentityRow::into_identity).collect(),
            total: total as u64,
        })
    }

    async fn recent_logins(&self, limit: u32) -> AuthResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities ORDER BY last_login_at DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(IdentityRow::into_identity).collect())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                identity_id,
                expires_at_ms,
                created_at,
                last_seen_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.identity_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(session.created_at)
        .bind(session.last_seen_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, session_id: &SessionId) -> AuthResult<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                identity_id,
                expires_at_ms,
                created_at,
                last_seen_at
            FROM auth_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }

    async fn update_session(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at_ms = $2,
                last_seen_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(session.last_seen_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: &SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired_sessions(&self, now_ms: i64) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct IdentityRow {
    identity_id: Uuid,
    subject_id: String,
    email: String,
    display_name: String,
    picture: Option<String>,
    created_at: DateTime<Utc>,
    last_login_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_identity(self) -> Identity {
        Identity {
            identity_id: IdentityId::from_uuid(self.identity_id),
            subject_id: self.subject_id,
            email: Email::from_db(self.email),
            display_name: self.display_name,
            picture: self.picture,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    identity_id: Uuid,
    expires_at_ms: i64,
    created_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: SessionId::from_uuid(self.session_id),
            identity_id: IdentityId::from_uuid(self.identity_id),
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
            last_seen_at: self.last_seen_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ravi"), "%ravi%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
