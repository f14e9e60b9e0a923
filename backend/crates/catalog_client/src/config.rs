//! Client Configuration

use platform::retry::RetryPolicy;
use reqwest::Url;
use std::time::Duration;

use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://localhost:3000`
    pub base_url: Url,
    /// Name of the session cookie sent with every request
    pub session_cookie_name: String,
    /// How long a fetched listing is served without a round trip
    pub listing_freshness: Duration,
    /// Applied to listing reads only; writes are attempted once
    pub retry: RetryPolicy,
    /// Per-attempt timeout; `None` keeps the transport default
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidConfig(format!("base URL {base_url:?}: {e}")))?;
        Ok(Self {
            base_url,
            session_cookie_name: "sessionId".to_string(),
            listing_freshness: Duration::from_secs(5 * 60),
            retry: RetryPolicy::default(),
            request_timeout: None,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_listing_freshness(mut self, freshness: Duration) -> Self {
        self.listing_freshness = freshness;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Absolute URL for an API path such as `/api/chapters`
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidConfig(format!("path {path:?}: {e}")))
    }
}
