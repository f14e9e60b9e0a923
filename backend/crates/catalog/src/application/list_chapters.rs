//! List Chapters Use Case
//!
//! Serves listings from the bounded-freshness cache and falls through to
//! the repository on a miss. Each distinct filter is its own cache entry.

use std::sync::Arc;

use platform::cache::{ListingCache, Lookup};

use crate::domain::entities::Chapter;
use crate::domain::repository::ChapterRepository;
use crate::domain::value_objects::ChapterFilter;
use crate::error::CatalogResult;

/// Server-side listing cache, shared by readers and writers
pub type ChapterCache = ListingCache<ChapterFilter, Arc<Vec<Chapter>>>;

#[derive(Debug, Clone)]
pub struct Listing {
    pub chapters: Arc<Vec<Chapter>>,
    /// Served from the cache without touching the store
    pub cached: bool,
}

pub struct ListChaptersUseCase<R>
where
    R: ChapterRepository,
{
    repo: Arc<R>,
    cache: Arc<ChapterCache>,
}

impl<R> ListChaptersUseCase<R>
where
    R: ChapterRepository + Sync,
{
    pub fn new(repo: Arc<R>, cache: Arc<ChapterCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(&self, filter: ChapterFilter) -> CatalogResult<Listing> {
        match self.cache.lookup(&filter) {
            Lookup::Hit(chapters) => {
                tracing::debug!(?filter, count = chapters.len(), "Listing cache hit");
                return Ok(Listing {
                    chapters,
                    cached: true,
                });
            }
            Lookup::Stale => tracing::debug!(?filter, "Listing cache stale"),
            Lookup::Miss => tracing::debug!(?filter, "Listing cache miss"),
        }

        let epoch = self.cache.epoch();
        let chapters = Arc::new(self.repo.list(&filter).await?);

        // A write that landed during the read has already invalidated; keep
        // this result out of the cache so the next read sees the write.
        if !self.cache.put_if_current(filter, chapters.clone(), epoch) {
            tracing::debug!("Listing changed during read, not caching");
        }

        Ok(Listing {
            chapters,
            cached: false,
        })
    }
}
