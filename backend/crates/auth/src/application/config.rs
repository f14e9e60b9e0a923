//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::value_object::allowed_domain::AllowedDomain;

/// OAuth client settings for the federated identity provider
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered with the provider
    pub callback_url: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub scopes: Vec<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: "http://localhost:3000/auth/google/callback".to_string(),
            authorize_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_endpoint: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Lifetime granted at login and on every rolling extension
    pub session_ttl: Duration,
    /// Extend expiry on authenticated activity
    pub rolling_sessions: bool,
    /// Hard ceiling measured from session creation. `None` = no ceiling.
    pub session_max_lifetime: Option<Duration>,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    pub cookie_domain: Option<String>,
    /// Only emails under this domain may sign in
    pub allowed_domain: String,
    /// Base URL of the frontend, used for post-login redirects
    pub frontend_url: String,
    pub post_login_path: String,
    pub login_path: String,
    /// Cookie holding the OAuth `state` between redirect and callback
    pub state_cookie_name: String,
    pub state_ttl: Duration,
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "sessionId".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(24 * 3600), // 24 hours
            rolling_sessions: true,
            session_max_lifetime: None,
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            cookie_domain: None,
            allowed_domain: "bmsce.ac.in".to_string(),
            frontend_url: "http://localhost:8000".to_string(),
            post_login_path: "/frontend/pages/index.html".to_string(),
            login_path: "/login".to_string(),
            state_cookie_name: "oauth_state".to_string(),
            state_ttl: Duration::from_secs(10 * 60),
            oauth: OAuthConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn allowed_domain(&self) -> AllowedDomain {
        AllowedDomain::new(&self.allowed_domain)
    }

    /// Session cookie settings without a lifetime
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            domain: self.cookie_domain.clone(),
            max_age_secs: None,
        }
    }

    /// Short-lived cookie for the OAuth round trip
    pub fn state_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.state_cookie_name.clone(),
            ..self.session_cookie()
        }
        .with_max_age(self.state_ttl.as_secs() as i64)
    }

    pub fn post_login_url(&self) -> String {
        format!(
            "{}{}",
            self.frontend_url.trim_end_matches('/'),
            self.post_login_path
        )
    }

    /// `/login?error=<reason>` on the frontend
    pub fn login_error_url(&self, reason: &str) -> String {
        format!(
            "{}{}?error={}",
            self.frontend_url.trim_end_matches('/'),
            self.login_path,
            reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_cookie_name, "sessionId");
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert!(config.rolling_sessions);
        assert!(config.session_max_lifetime.is_none());
        assert_eq!(config.cookie_same_site, SameSite::Lax);
    }

    #[test]
    fn test_development_has_random_secret_and_insecure_cookie() {
        let a = AuthConfig::development();
        let b = AuthConfig::development();
        assert!(!a.cookie_secure);
        assert_ne!(a.session_secret, [0u8; 32]);
        assert_ne!(a.session_secret, b.session_secret);
    }

    #[test]
    fn test_redirect_urls() {
        let config = AuthConfig {
            frontend_url: "http://localhost:8000/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.post_login_url(),
            "http://localhost:8000/frontend/pages/index.html"
        );
        assert_eq!(
            config.login_error_url("access_denied"),
            "http://localhost:8000/login?error=access_denied"
        );
    }

    #[test]
    fn test_state_cookie_is_short_lived() {
        let cookie = AuthConfig::default().state_cookie();
        assert_eq!(cookie.name, "oauth_state");
        assert_eq!(cookie.max_age_secs, Some(600));
        assert!(cookie.http_only);
    }
}
