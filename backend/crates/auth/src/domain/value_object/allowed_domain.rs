//! Allowed Domain
//!
//! The single email domain whose members may use the service. Matching is
//! exact on the part after `@`, so `x@cs.bmsce.ac.in` and
//! `x@bmsce.ac.in.evil.com` are both outside `bmsce.ac.in`.

use super::email::Email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedDomain(String);

impl AllowedDomain {
    /// Accepts `bmsce.ac.in` or `@bmsce.ac.in`, any case
    pub fn new(domain: impl AsRef<str>) -> Self {
        let domain = domain.as_ref().trim().trim_start_matches('@').to_lowercase();
        Self(domain)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn permits(&self, email: &Email) -> bool {
        !self.0.is_empty() && email.domain() == self.0
    }

    /// Same check on a raw provider string; unparseable input is never permitted
    pub fn permits_raw(&self, email: &str) -> bool {
        Email::new(email).is_ok_and(|email| self.permits(&email))
    }
}

impl std::fmt::Display for AllowedDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> AllowedDomain {
        AllowedDomain::new("@BMSCE.ac.in")
    }

    #[test]
    fn test_exact_domain_is_permitted() {
        assert!(domain().permits_raw("student@bmsce.ac.in"));
        assert!(domain().permits_raw("Student@BMSCE.AC.IN"));
    }

    #[test]
    fn test_lookalike_domains_are_rejected() {
        let d = domain();
        assert!(!d.permits_raw("student@gmail.com"));
        assert!(!d.permits_raw("student@bmsce.ac.in.evil.com"));
        assert!(!d.permits_raw("student@notbmsce.ac.in"));
        assert!(!d.permits_raw("student@cs.bmsce.ac.in"));
        assert!(!d.permits_raw("bmsce.ac.in"));
        assert!(!d.permits_raw(""));
    }

    #[test]
    fn test_empty_domain_permits_nobody() {
        assert!(!AllowedDomain::new("").permits_raw("a@b.com"));
    }
}
