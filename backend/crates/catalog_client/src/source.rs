//! Catalog Source
//!
//! One round trip to wherever the catalog lives. The fetcher layers offline
//! checks, caching and retries on top.

use crate::error::SourceError;
use crate::model::{ChapterPayload, ChapterRecord, ListingQuery};

#[trait_variant::make(CatalogSource: Send)]
pub trait LocalCatalogSource {
    async fn list_chapters(&self, query: &ListingQuery) -> Result<Vec<ChapterRecord>, SourceError>;

    async fn create_chapter(&self, payload: &ChapterPayload) -> Result<ChapterRecord, SourceError>;

    async fn update_chapter(
        &self,
        chapter_id: &str,
        payload: &ChapterPayload,
    ) -> Result<ChapterRecord, SourceError>;

    async fn delete_chapter(&self, chapter_id: &str) -> Result<(), SourceError>;
}
