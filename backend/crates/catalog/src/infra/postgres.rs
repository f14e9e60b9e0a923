//! PostgreSQL Chapter Repository

use chrono::{DateTime, Utc};
use kernel::id::ChapterId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Chapter;
use crate::domain::repository::ChapterRepository;
use crate::domain::value_objects::{ChapterFilter, ChapterNumber, ClassNumber};
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct PgChapterRepository {
    pool: PgPool,
}

impl PgChapterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHAPTER_COLUMNS: &str = "chapter_id, title, chapter_number, class_number, unit_name, \
     video_link, notes_link, questions_link, created_at, updated_at";

/// Escape LIKE wildcards so search text matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl ChapterRepository for PgChapterRepository {
    async fn list(&self, filter: &ChapterFilter) -> CatalogResult<Vec<Chapter>> {
        let rows = sqlx::query_as::<_, ChapterRow>(&format!(
            r#"
            SELECT {CHAPTER_COLUMNS}
            FROM chapters
            WHERE ($1::smallint IS NULL OR class_number = $1)
              AND ($2::text IS NULL OR unit_name = $2)
              AND ($3::text IS NULL OR title ILIKE $3 OR unit_name ILIKE $3)
            ORDER BY class_number, chapter_number, title
            "#
        ))
        .bind(filter.class_number.map(|c| c.value()))
        .bind(filter.unit_name.as_deref())
        .bind(filter.search.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChapterRow::into_chapter).collect()
    }

    async fn find(&self, chapter_id: &ChapterId) -> CatalogResult<Option<Chapter>> {
        let row = sqlx::query_as::<_, ChapterRow>(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE chapter_id = $1"
        ))
        .bind(chapter_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChapterRow::into_chapter).transpose()
    }

    async fn insert(&self, chapter: &Chapter) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chapters (
                chapter_id,
                title,
                chapter_number,
                class_number,
                unit_name,
                video_link,
                notes_link,
                questions_link,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(chapter.chapter_id.as_uuid())
        .bind(&chapter.title)
        .bind(chapter.chapter_number.value())
        .bind(chapter.class_number.value())
        .bind(&chapter.unit_name)
        .bind(chapter.video_link.as_deref())
        .bind(chapter.notes_link.as_deref())
        .bind(chapter.questions_link.as_deref())
        .bind(chapter.created_at)
        .bind(chapter.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, chapter: &Chapter) -> CatalogResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE chapters
            SET title = $2,
                chapter_number = $3,
                class_number = $4,
                unit_name = $5,
                video_link = $6,
                notes_link = $7,
                questions_link = $8,
                updated_at = $9
            WHERE chapter_id = $1
            "#,
        )
        .bind(chapter.chapter_id.as_uuid())
        .bind(&chapter.title)
        .bind(chapter.chapter_number.value())
        .bind(chapter.class_number.value())
        .bind(&chapter.unit_name)
        .bind(chapter.video_link.as_deref())
        .bind(chapter.notes_link.as_deref())
        .bind(chapter.questions_link.as_deref())
        .bind(chapter.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, chapter_id: &ChapterId) -> CatalogResult<bool> {
        let result = sqlx::query("DELETE FROM chapters WHERE chapter_id = $1")
            .bind(chapter_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ChapterRow {
    chapter_id: Uuid,
    title: String,
    chapter_number: f64,
    class_number: i16,
    unit_name: String,
    video_link: Option<String>,
    notes_link: Option<String>,
    questions_link: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChapterRow {
    fn into_chapter(self) -> CatalogResult<Chapter> {
        // The table has a CHECK constraint, so this only trips on manual edits
        let class_number = ClassNumber::new(i64::from(self.class_number)).ok_or_else(|| {
            CatalogError::Internal(format!(
                "chapter {} has class_number {}",
                self.chapter_id, self.class_number
            ))
        })?;

        Ok(Chapter {
            chapter_id: ChapterId::from_uuid(self.chapter_id),
            title: self.title,
            chapter_number: ChapterNumber::from_db(self.chapter_number),
            class_number,
            unit_name: self.unit_name,
            video_link: self.video_link.filter(|l| !l.is_empty()),
            notes_link: self.notes_link.filter(|l| !l.is_empty()),
            questions_link: self.questions_link.filter(|l| !l.is_empty()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
