//! Auth Session Entity
//!
//! One authenticated browsing period. Valid iff `now < expires_at_ms`.
//! Rolling expiry pushes the deadline out on activity, never past the
//! optional hard ceiling measured from `created_at`.

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, SessionId};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub identity_id: IdentityId,
    /// Absolute expiry (Unix milliseconds)
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl AuthSession {
    /// Fresh session expiring after `ttl`, or at `max_lifetime` when that
    /// comes first
    pub fn new(
        identity_id: IdentityId,
        now: DateTime<Utc>,
        ttl: Duration,
        max_lifetime: Option<Duration>,
    ) -> Self {
        let lifetime = max_lifetime.map_or(ttl, |ceiling| ttl.min(ceiling));
        Self {
            session_id: SessionId::new(),
            identity_id,
            expires_at_ms: now.timestamp_millis().saturating_add(duration_ms(lifetime)),
            created_at: now,
            last_seen_at: now,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() < self.expires_at_ms
    }

    /// Milliseconds left, zero once expired
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at_ms - now.timestamp_millis()).max(0)
    }

    /// Deadline after activity at `now`: `now + ttl`, capped by
    /// `created_at + max_lifetime`. Never moves the deadline backwards.
    pub fn extended_expiry(
        &self,
        now: DateTime<Utc>,
        ttl: Duration,
        max_lifetime: Option<Duration>,
    ) -> i64 {
        let mut next = now.timestamp_millis().saturating_add(duration_ms(ttl));
        if let Some(ceiling) = max_lifetime {
            let hard = self
                .created_at
                .timestamp_millis()
                .saturating_add(duration_ms(ceiling));
            next = next.min(hard);
        }
        next.max(self.expires_at_ms)
    }

    pub fn touch(&mut self, now: DateTime<Utc>, ttl: Duration, max_lifetime: Option<Duration>) {
        self.expires_at_ms = self.extended_expiry(now, ttl, max_lifetime);
        self.last_seen_at = now;
    }
}

fn duration_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 3600);

    #[test]
    fn test_valid_until_exact_expiry() {
        let now = Utc::now();
        let session = AuthSession::new(IdentityId::new(), now, DAY, None);

        assert!(session.is_valid_at(now));
        let at_expiry = DateTime::from_timestamp_millis(session.expires_at_ms).unwrap();
        assert!(!session.is_valid_at(at_expiry));
        assert!(session.is_valid_at(at_expiry - chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_new_is_capped_by_ceiling() {
        let now = Utc::now();
        let hour = Duration::from_secs(3600);
        let session = AuthSession::new(IdentityId::new(), now, DAY, Some(hour));

        assert_eq!(session.expires_at_ms, now.timestamp_millis() + 3_600_000);
        assert!(!session.is_valid_at(now + chrono::Duration::hours(2)));

        // A ceiling longer than the ttl changes nothing
        let session = AuthSession::new(IdentityId::new(), now, hour, Some(DAY));
        assert_eq!(session.expires_at_ms, now.timestamp_millis() + 3_600_000);
    }

    #[test]
    fn test_touch_rolls_forward_without_ceiling() {
        let start = Utc::now();
        let mut session = AuthSession::new(IdentityId::new(), start, DAY, None);

        let later = start + chrono::Duration::hours(20);
        session.touch(later, DAY, None);

        assert_eq!(
            session.expires_at_ms,
            later.timestamp_millis() + DAY.as_millis() as i64
        );
        assert_eq!(session.last_seen_at, later);
    }

    #[test]
    fn test_touch_respects_hard_ceiling() {
        let start = Utc::now();
        let ceiling = Duration::from_secs(36 * 3600);
        let mut session = AuthSession::new(IdentityId::new(), start, DAY, None);

        session.touch(start + chrono::Duration::hours(30), DAY, Some(ceiling));

        assert_eq!(
            session.expires_at_ms,
            start.timestamp_millis() + ceiling.as_millis() as i64
        );
    }

    #[test]
    fn test_touch_never_shortens() {
        let start = Utc::now();
        let mut session = AuthSession::new(IdentityId::new(), start, DAY, None);
        let original = session.expires_at_ms;

        // A stale touch from earlier than creation cannot pull expiry in
        session.touch(start - chrono::Duration::hours(1), DAY, None);
        assert_eq!(session.expires_at_ms, original);
    }
}
