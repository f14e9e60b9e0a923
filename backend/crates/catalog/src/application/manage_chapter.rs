//! Manage Chapter Use Case
//!
//! Create, update, delete and duplicate. A successful write clears the
//! listing cache before returning, so the caller's next listing read
//! reflects it regardless of how fresh the cached entry was.

use chrono::Utc;
use kernel::id::ChapterId;
use std::sync::Arc;

use crate::application::list_chapters::ChapterCache;
use crate::domain::entities::Chapter;
use crate::domain::repository::ChapterRepository;
use crate::domain::services::{ChapterInput, validate_chapter};
use crate::error::{CatalogError, CatalogResult};

pub struct ManageChapterUseCase<R>
where
    R: ChapterRepository,
{
    repo: Arc<R>,
    cache: Arc<ChapterCache>,
}

impl<R> ManageChapterUseCase<R>
where
    R: ChapterRepository + Sync,
{
    pub fn new(repo: Arc<R>, cache: Arc<ChapterCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn create(&self, input: &ChapterInput) -> CatalogResult<Chapter> {
        let draft = validate_chapter(input).map_err(CatalogError::Validation)?;
        let chapter = Chapter::new(draft, Utc::now());

        self.repo.insert(&chapter).await?;
        self.written();

        tracing::info!(
            chapter_id = %chapter.chapter_id,
            class_number = %chapter.class_number,
            chapter_number = %chapter.chapter_number,
            "Chapter created"
        );
        Ok(chapter)
    }

    pub async fn update(
        &self,
        chapter_id: &ChapterId,
        input: &ChapterInput,
    ) -> CatalogResult<Chapter> {
        let draft = validate_chapter(input).map_err(CatalogError::Validation)?;

        let mut chapter = self
            .repo
            .find(chapter_id)
            .await?
            .ok_or(CatalogError::NotFound)?;
        chapter.apply(draft, Utc::now());

        // Deleted between the read and the write
        if !self.repo.update(&chapter).await? {
            return Err(CatalogError::NotFound);
        }
        self.written();

        tracing::info!(chapter_id = %chapter_id, "Chapter updated");
        Ok(chapter)
    }

    pub async fn delete(&self, chapter_id: &ChapterId) -> CatalogResult<()> {
        if !self.repo.delete(chapter_id).await? {
            return Err(CatalogError::NotFound);
        }
        self.written();

        tracing::info!(chapter_id = %chapter_id, "Chapter deleted");
        Ok(())
    }

    pub async fn duplicate(&self, chapter_id: &ChapterId) -> CatalogResult<Chapter> {
        let original = self
            .repo
            .find(chapter_id)
            .await?
            .ok_or(CatalogError::NotFound)?;
        let copy = original.duplicate(Utc::now());

        self.repo.insert(&copy).await?;
        self.written();

        tracing::info!(
            source_id = %chapter_id,
            chapter_id = %copy.chapter_id,
            "Chapter duplicated"
        );
        Ok(copy)
    }

    fn written(&self) {
        self.cache.invalidate_all();
    }
}
