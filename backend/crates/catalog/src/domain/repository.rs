//! Repository Traits

use kernel::id::ChapterId;

use crate::domain::entities::Chapter;
use crate::domain::value_objects::ChapterFilter;
use crate::error::CatalogResult;

/// Chapter persistence.
///
/// Listings come back ordered by class number, then chapter number.
#[trait_variant::make(ChapterRepository: Send)]
pub trait LocalChapterRepository {
    async fn list(&self, filter: &ChapterFilter) -> CatalogResult<Vec<Chapter>>;

    async fn find(&self, chapter_id: &ChapterId) -> CatalogResult<Option<Chapter>>;

    async fn insert(&self, chapter: &Chapter) -> CatalogResult<()>;

    /// Returns `false` when no chapter has this id
    async fn update(&self, chapter: &Chapter) -> CatalogResult<bool>;

    /// Returns `false` when no chapter has this id
    async fn delete(&self, chapter_id: &ChapterId) -> CatalogResult<bool>;
}
