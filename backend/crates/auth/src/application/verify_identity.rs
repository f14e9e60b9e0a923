//! Identity Verifier
//!
//! Decides whether a provider profile may use the service and, when it may,
//! upserts the matching Identity. A denial is a normal outcome, not an
//! error; `Err` is reserved for store failures.

use chrono::Utc;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{
    email::{Email, EmailError},
    provider_profile::ProviderProfile,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Email is outside the allowed domain
    DomainNotAllowed { domain: String },
    /// Provider sent something that is not an email address
    InvalidEmail(EmailError),
    /// Provider has not confirmed the person controls the address
    EmailNotVerified,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Allowed(Identity),
    Denied(Denial),
}

pub struct IdentityVerifier<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> IdentityVerifier<R>
where
    R: IdentityRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn verify(&self, profile: &ProviderProfile) -> AuthResult<Verification> {
        let email = match Email::new(&profile.email) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(subject_id = %profile.subject_id, error = %e, "Provider sent invalid email");
                return Ok(Verification::Denied(Denial::InvalidEmail(e)));
            }
        };

        if !profile.email_verified {
            tracing::warn!(
                subject_id = %profile.subject_id,
                email_domain = %email.domain(),
                "Login denied: email not verified by provider"
            );
            return Ok(Verification::Denied(Denial::EmailNotVerified));
        }

        if !self.config.allowed_domain().permits(&email) {
            tracing::warn!(
                subject_id = %profile.subject_id,
                email_domain = %email.domain(),
                "Login denied: domain not allowed"
            );
            return Ok(Verification::Denied(Denial::DomainNotAllowed {
                domain: email.domain().to_string(),
            }));
        }

        let now = Utc::now();

        if let Some(identity) = self.returning(&profile.subject_id, now).await? {
            return Ok(Verification::Allowed(identity));
        }

        let identity = Identity::new(profile, email, now);
        match self.repo.create_identity(&identity).await {
            Ok(()) => {
                tracing::info!(identity_id = %identity.identity_id, "New identity registered");
                Ok(Verification::Allowed(identity))
            }
            // A concurrent first login for the same subject won the insert
            Err(AuthError::IdentityConflict) => self
                .returning(&profile.subject_id, now)
                .await?
                .map(Verification::Allowed)
                .ok_or(AuthError::IdentityConflict),
            Err(e) => Err(e),
        }
    }

    /// Existing identity for `subject_id` with its login recorded
    async fn returning(
        &self,
        subject_id: &str,
        now: chrono::DateTime<Utc>,
    ) -> AuthResult<Option<Identity>> {
        let Some(mut identity) = self.repo.find_identity_by_subject(subject_id).await? else {
            return Ok(None);
        };
        self.repo.record_login(&identity.identity_id, now).await?;
        identity.record_login(now);
        tracing::debug!(identity_id = %identity.identity_id, "Returning identity");
        Ok(Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryAuthRepository;

    fn verifier() -> (IdentityVerifier<MemoryAuthRepository>, Arc<MemoryAuthRepository>) {
        let repo = Arc::new(MemoryAuthRepository::new());
        (
            IdentityVerifier::new(repo.clone(), Arc::new(AuthConfig::development())),
            repo,
        )
    }

    fn profile(subject: &str, email: &str) -> ProviderProfile {
        ProviderProfile {
            subject_id: subject.into(),
            email: email.into(),
            display_name: "Ravi".into(),
            picture: Some("https://example.com/p.png".into()),
            email_verified: true,
        }
    }

    #[tokio::test]
    async fn test_foreign_domain_is_denied_regardless_of_profile() {
        let (verifier, repo) = verifier();
        for email in [
            "ravi@gmail.com",
            "ravi@bmsce.ac.in.example.com",
            "ravi@cs.bmsce.ac.in",
        ] {
            let mut p = profile("s1", email);
            p.display_name = "BMSCE Admin".into();
            let outcome = verifier.verify(&p).await.unwrap();
            assert!(
                matches!(outcome, Verification::Denied(Denial::DomainNotAllowed { .. })),
                "{email} should be denied"
            );
        }
        assert_eq!(repo.count_identities().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unverified_email_is_denied_even_in_domain() {
        let (verifier, repo) = verifier();
        let mut p = profile("s1", "ravi@bmsce.ac.in");
        p.email_verified = false;

        let outcome = verifier.verify(&p).await.unwrap();
        assert_eq!(outcome, Verification::Denied(Denial::EmailNotVerified));
        assert_eq!(repo.count_identities().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_garbage_email_is_denied() {
        let (verifier, _) = verifier();
        let outcome = verifier.verify(&profile("s1", "not an email")).await.unwrap();
        assert!(matches!(outcome, Verification::Denied(Denial::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_first_login_creates_identity() {
        let (verifier, repo) = verifier();
        let Verification::Allowed(identity) =
            verifier.verify(&profile("s1", "Ravi@BMSCE.ac.in")).await.unwrap()
        else {
            panic!("should be allowed");
        };
        assert_eq!(identity.email.as_str(), "ravi@bmsce.ac.in");
        assert_eq!(repo.count_identities().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_login_does_not_overwrite_email() {
        let (verifier, repo) = verifier();
        let Verification::Allowed(first) =
            verifier.verify(&profile("s1", "ravi@bmsce.ac.in")).await.unwrap()
        else {
            panic!("should be allowed");
        };

        // Provider data drifted: same subject, new address and name
        let mut drifted = profile("s1", "ravi.k@bmsce.ac.in");
        drifted.display_name = "Ravi K".into();
        let Verification::Allowed(second) = verifier.verify(&drifted).await.unwrap() else {
            panic!("should be allowed");
        };

        assert_eq!(second.identity_id, first.identity_id);
        assert_eq!(second.email.as_str(), "ravi@bmsce.ac.in");
        assert!(second.last_login_at >= first.last_login_at);

        let stored = repo.find_identity(&first.identity_id).await.unwrap().unwrap();
        assert_eq!(stored.email.as_str(), "ravi@bmsce.ac.in");
        assert_eq!(stored.display_name, "Ravi");
        assert_eq!(repo.count_identities().await.unwrap(), 1);
    }
}
