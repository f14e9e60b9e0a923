//! In-Memory Chapter Repository
//!
//! Same ordering and filter semantics as the PostgreSQL repository.

use kernel::id::ChapterId;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::Chapter;
use crate::domain::repository::ChapterRepository;
use crate::domain::value_objects::ChapterFilter;
use crate::error::CatalogResult;

#[derive(Debug, Clone, Default)]
pub struct MemoryChapterRepository {
    chapters: Arc<RwLock<HashMap<ChapterId, Chapter>>>,
}

impl MemoryChapterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chapters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches(chapter: &Chapter, filter: &ChapterFilter) -> bool {
    if filter.class_number.is_some_and(|c| c != chapter.class_number) {
        return false;
    }
    if filter
        .unit_name
        .as_deref()
        .is_some_and(|unit| unit != chapter.unit_name)
    {
        return false;
    }
    match filter.search.as_deref() {
        // Filter search text is already lowercase
        Some(needle) => {
            chapter.title.to_lowercase().contains(needle)
                || chapter.unit_name.to_lowercase().contains(needle)
        }
        None => true,
    }
}

/// Class, then chapter number, then title for equal numbers
fn listing_order(a: &Chapter, b: &Chapter) -> Ordering {
    a.class_number
        .cmp(&b.class_number)
        .then_with(|| {
            a.chapter_number
                .value()
                .total_cmp(&b.chapter_number.value())
        })
        .then_with(|| a.title.cmp(&b.title))
}

impl ChapterRepository for MemoryChapterRepository {
    async fn list(&self, filter: &ChapterFilter) -> CatalogResult<Vec<Chapter>> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .read()
            .values()
            .filter(|c| matches(c, filter))
            .cloned()
            .collect();
        chapters.sort_by(listing_order);
        Ok(chapters)
    }

    async fn find(&self, chapter_id: &ChapterId) -> CatalogResult<Option<Chapter>> {
        Ok(self.chapters.read().get(chapter_id).cloned())
    }

    async fn insert(&self, chapter: &Chapter) -> CatalogResult<()> {
        self.chapters
            .write()
            .insert(chapter.chapter_id, chapter.clone());
        Ok(())
    }

    async fn update(&self, chapter: &Chapter) -> CatalogResult<bool> {
        let mut chapters = self.chapters.write();
        match chapters.get_mut(&chapter.chapter_id) {
            Some(stored) => {
                *stored = chapter.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, chapter_id: &ChapterId) -> CatalogResult<bool> {
        Ok(self.chapters.write().remove(chapter_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ChapterDraft;
    use crate::domain::value_objects::{ChapterNumber, ClassNumber};
    use chrono::Utc;

    fn chapter(title: &str, number: f64, class: ClassNumber, unit: &str) -> Chapter {
        Chapter::new(
            ChapterDraft {
                title: title.into(),
                chapter_number: ChapterNumber::new(number).unwrap(),
                class_number: class,
                unit_name: unit.into(),
                video_link: None,
                notes_link: None,
                questions_link: None,
            },
            Utc::now(),
        )
    }

    async fn seeded() -> MemoryChapterRepository {
        let repo = MemoryChapterRepository::new();
        for c in [
            chapter("Gravitation", 2.0, ClassNumber::Ten, "Mechanics"),
            chapter("Atoms", 1.0, ClassNumber::Nine, "Matter"),
            chapter("Kinematics", 1.0, ClassNumber::Ten, "Mechanics"),
            chapter("Kinematics (Copy)", 1.5, ClassNumber::Ten, "Mechanics"),
        ] {
            repo.insert(&c).await.unwrap();
        }
        repo
    }

    fn titles(chapters: &[Chapter]) -> Vec<&str> {
        chapters.iter().map(|c| c.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_orders_by_class_then_number() {
        let repo = seeded().await;
        let all = repo.list(&ChapterFilter::all()).await.unwrap();
        assert_eq!(
            titles(&all),
            vec!["Atoms", "Kinematics", "Kinematics (Copy)", "Gravitation"]
        );
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let repo = seeded().await;

        let tenth = ChapterFilter::new(Some(ClassNumber::Ten), None, None);
        assert_eq!(repo.list(&tenth).await.unwrap().len(), 3);

        let search = ChapterFilter::new(None, None, Some("KINEMATICS"));
        assert_eq!(repo.list(&search).await.unwrap().len(), 2);

        let by_unit = ChapterFilter::new(None, Some("Matter"), None);
        assert_eq!(titles(&repo.list(&by_unit).await.unwrap()), vec!["Atoms"]);

        // Unit name matching is exact
        let partial_unit = ChapterFilter::new(None, Some("Mech"), None);
        assert!(repo.list(&partial_unit).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let repo = MemoryChapterRepository::new();
        let ghost = chapter("Ghost", 1.0, ClassNumber::Nine, "Unit");

        assert!(!repo.update(&ghost).await.unwrap());
        assert!(!repo.delete(&ghost.chapter_id).await.unwrap());

        repo.insert(&ghost).await.unwrap();
        assert!(repo.delete(&ghost.chapter_id).await.unwrap());
        assert!(repo.is_empty());
    }
}
