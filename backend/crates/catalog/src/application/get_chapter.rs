//! Get Chapter Use Case

use kernel::id::ChapterId;
use std::sync::Arc;

use crate::domain::entities::Chapter;
use crate::domain::repository::ChapterRepository;
use crate::error::{CatalogError, CatalogResult};

pub struct GetChapterUseCase<R>
where
    R: ChapterRepository,
{
    repo: Arc<R>,
}

impl<R> GetChapterUseCase<R>
where
    R: ChapterRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, chapter_id: &ChapterId) -> CatalogResult<Chapter> {
        self.repo
            .find(chapter_id)
            .await?
            .ok_or(CatalogError::NotFound)
    }
}
