//! Catalog Fetcher
//!
//! `fetch_listing` order of business:
//! 1. reject filters the server would reject anyway
//! 2. serve a fresh cached listing for the same query
//! 3. fail fast with `Offline` while the connectivity flag is off
//! 4. fetch with bounded retries and growing delays, giving up as soon as
//!    the connectivity flag drops
//! 5. cache the result under the query, unless a write landed meanwhile
//!
//! Failures are never cached. Writes go out once and clear the cache.

use std::sync::Arc;

use platform::cache::ListingCache;
use platform::retry::{RetryPolicy, retry};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::error::{FetchError, SourceError};
use crate::model::{ChapterPayload, ChapterRecord, ListingQuery};
use crate::source::CatalogSource;

pub type Listing = Arc<Vec<ChapterRecord>>;

pub struct CatalogFetcher<S>
where
    S: CatalogSource,
{
    source: Arc<S>,
    monitor: ConnectivityMonitor,
    cache: ListingCache<ListingQuery, Listing>,
    retry: RetryPolicy,
}

impl<S> CatalogFetcher<S>
where
    S: CatalogSource + Sync,
{
    pub fn new(source: Arc<S>, monitor: ConnectivityMonitor, config: &ClientConfig) -> Self {
        Self {
            source,
            monitor,
            cache: ListingCache::new(config.listing_freshness),
            retry: config.retry.clone(),
        }
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    pub async fn fetch_listing(&self, query: &ListingQuery) -> Result<Listing, FetchError> {
        self.fetch_listing_until(query, &CancellationToken::new())
            .await
    }

    /// Like [`fetch_listing`](Self::fetch_listing), abandoned when `cancel` fires
    pub async fn fetch_listing_until(
        &self,
        query: &ListingQuery,
        cancel: &CancellationToken,
    ) -> Result<Listing, FetchError> {
        query.validate()?;

        if let Some(listing) = self.cache.get(query) {
            tracing::debug!(?query, count = listing.len(), "Client listing cache hit");
            return Ok(listing);
        }

        self.ensure_online()?;

        let epoch = self.cache.epoch();
        let source = &self.source;
        let monitor = &self.monitor;

        let attempts = retry(&self.retry, cancel, move |attempt| async move {
            if !monitor.is_online() {
                return Err(SourceError::Offline);
            }
            tracing::debug!(attempt, "Fetching chapter listing");
            source.list_chapters(query).await
        });

        // Connectivity can drop mid-backoff; stop waiting as soon as it does
        let outcome = tokio::select! {
            biased;
            result = attempts => result.map_err(FetchError::from),
            _ = monitor.wait_offline() => Err(FetchError::Offline),
        };
        let records = outcome.map_err(|err| {
            tracing::warn!(error = %err, "Chapter listing fetch failed");
            err
        })?;

        let listing = Arc::new(records);
        self.cache
            .put_if_current(query.clone(), listing.clone(), epoch);
        Ok(listing)
    }

    pub async fn create_chapter(&self, payload: &ChapterPayload) -> Result<ChapterRecord, FetchError> {
        self.ensure_online()?;
        let record = self.source.create_chapter(payload).await?;
        self.invalidate();
        Ok(record)
    }

    pub async fn update_chapter(
        &self,
        chapter_id: &str,
        payload: &ChapterPayload,
    ) -> Result<ChapterRecord, FetchError> {
        self.ensure_online()?;
        let record = self.source.update_chapter(chapter_id, payload).await?;
        self.invalidate();
        Ok(record)
    }

    pub async fn delete_chapter(&self, chapter_id: &str) -> Result<(), FetchError> {
        self.ensure_online()?;
        self.source.delete_chapter(chapter_id).await?;
        self.invalidate();
        Ok(())
    }

    /// Drop every cached listing, e.g. on logout
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    fn ensure_online(&self) -> Result<(), FetchError> {
        if self.monitor.is_online() {
            Ok(())
        } else {
            tracing::debug!("Offline, skipping request");
            Err(FetchError::Offline)
        }
    }
}
