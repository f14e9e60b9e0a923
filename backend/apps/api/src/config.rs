//! Server Configuration
//!
//! Everything the binary needs, read once from the environment at startup.

use auth::{AuthConfig, OAuthConfig};
use base64::Engine;
use base64::engine::general_purpose;
use catalog::CatalogConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `None` runs on in-memory stores
    pub database_url: Option<String>,
    pub bind_address: SocketAddr,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_address = parse(
            "BIND_ADDRESS",
            &var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
        )?;

        let mut auth = if cfg!(debug_assertions) {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };
        match var("SESSION_SECRET") {
            Some(encoded) => auth.session_secret = decode_secret(&encoded)?,
            None if cfg!(debug_assertions) => {
                tracing::warn!("SESSION_SECRET not set, using a random secret");
            }
            None => return Err(ConfigError::Missing("SESSION_SECRET")),
        }
        if let Some(domain) = var("ALLOWED_DOMAIN") {
            auth.allowed_domain = domain.trim().to_lowercase();
        }
        if let Some(frontend_url) = var("FRONTEND_URL") {
            auth.frontend_url = frontend_url;
        }
        if let Some(secure) = var("COOKIE_SECURE") {
            auth.cookie_secure = parse("COOKIE_SECURE", &secure)?;
        }
        if let Some(ttl) = var("SESSION_TTL_SECS") {
            auth.session_ttl = secs("SESSION_TTL_SECS", &ttl)?;
        }
        if let Some(ceiling) = var("SESSION_MAX_LIFETIME_SECS") {
            auth.session_max_lifetime = Some(secs("SESSION_MAX_LIFETIME_SECS", &ceiling)?);
        }
        let oauth: &mut OAuthConfig = &mut auth.oauth;
        if let Some(client_id) = var("GOOGLE_CLIENT_ID") {
            oauth.client_id = client_id;
        }
        if let Some(client_secret) = var("GOOGLE_CLIENT_SECRET") {
            oauth.client_secret = client_secret;
        }
        if let Some(callback_url) = var("GOOGLE_CALLBACK_URL") {
            oauth.callback_url = callback_url;
        }

        let mut catalog = CatalogConfig::default();
        if let Some(ttl) = var("LISTING_CACHE_TTL_SECS") {
            catalog = catalog.with_listing_freshness(secs("LISTING_CACHE_TTL_SECS", &ttl)?);
        }

        Ok(Self {
            database_url: var("DATABASE_URL"),
            bind_address,
            auth,
            catalog,
        })
    }

    /// Whether federated login can actually complete
    pub fn oauth_configured(&self) -> bool {
        !self.auth.oauth.client_id.is_empty() && !self.auth.oauth.client_secret.is_empty()
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn secs(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = parse(name, raw)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn decode_secret(encoded: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::Invalid {
            name: "SESSION_SECRET",
            reason: e.to_string(),
        })?;
    bytes.try_into().map_err(|bytes: Vec<u8>| ConfigError::Invalid {
        name: "SESSION_SECRET",
        reason: format!("expected 32 bytes, got {}", bytes.len()),
    })
}
