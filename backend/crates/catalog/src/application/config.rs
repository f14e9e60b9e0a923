//! Catalog Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// How long a server-side listing stays fresh
    pub listing_freshness: Duration,
    /// `max-age` advertised to browsers on successful reads
    pub client_max_age: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            listing_freshness: Duration::from_secs(5 * 60),
            client_max_age: Duration::from_secs(5 * 60),
        }
    }
}

impl CatalogConfig {
    pub fn with_listing_freshness(mut self, freshness: Duration) -> Self {
        self.listing_freshness = freshness;
        self
    }

    /// `Cache-Control` value for successful GET responses
    pub fn read_cache_control(&self) -> String {
        format!("private, max-age={}", self.client_max_age.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_five_minutes() {
        let config = CatalogConfig::default();
        assert_eq!(config.listing_freshness, Duration::from_secs(300));
        assert_eq!(config.read_cache_control(), "private, max-age=300");
    }
}
