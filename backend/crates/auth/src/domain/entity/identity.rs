//! Identity Entity
//!
//! A verified person tied to one provider subject. Email and subject are
//! fixed at creation; later logins only move `last_login_at`.

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;

use crate::domain::value_object::{email::Email, provider_profile::ProviderProfile};

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub identity_id: IdentityId,
    pub subject_id: String,
    pub email: Email,
    pub display_name: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl Identity {
    /// First login of a verified profile
    pub fn new(profile: &ProviderProfile, email: Email, now: DateTime<Utc>) -> Self {
        Self {
            identity_id: IdentityId::new(),
            subject_id: profile.subject_id.clone(),
            email,
            display_name: profile.display_name.clone(),
            picture: profile.picture.clone(),
            created_at: now,
            last_login_at: now,
        }
    }

    /// Subsequent login. Only the timestamp moves, whatever the provider now says.
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str) -> ProviderProfile {
        ProviderProfile {
            subject_id: "sub-1".into(),
            email: email.into(),
            display_name: "Asha".into(),
            picture: None,
            email_verified: true,
        }
    }

    #[test]
    fn test_record_login_only_moves_timestamp() {
        let created = Utc::now();
        let p = profile("asha@bmsce.ac.in");
        let mut identity = Identity::new(&p, Email::new(&p.email).unwrap(), created);
        let before = identity.clone();

        let later = created + chrono::Duration::hours(3);
        identity.record_login(later);

        assert_eq!(identity.last_login_at, later);
        assert_eq!(identity.email, before.email);
        assert_eq!(identity.subject_id, before.subject_id);
        assert_eq!(identity.created_at, before.created_at);
    }
}
