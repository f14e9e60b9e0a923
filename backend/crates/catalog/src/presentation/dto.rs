//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Chapter;
use crate::domain::services::ChapterInput;
use crate::domain::value_objects::NumericInput;

/// Wire form of a chapter. Absent links are omitted, never `null` or `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDto {
    pub id: String,
    pub title: String,
    pub chapter_number: f64,
    pub class_number: i16,
    pub unit_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Chapter> for ChapterDto {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.chapter_id.to_string(),
            title: chapter.title.clone(),
            chapter_number: chapter.chapter_number.value(),
            class_number: chapter.class_number.value(),
            unit_name: chapter.unit_name.clone(),
            video_link: chapter.video_link.clone(),
            notes_link: chapter.notes_link.clone(),
            questions_link: chapter.questions_link.clone(),
            created_at: chapter.created_at,
            updated_at: chapter.updated_at,
        }
    }
}

/// GET /api/chapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<ChapterDto>,
}

impl ListResponse {
    pub fn new(chapters: &[Chapter]) -> Self {
        Self {
            success: true,
            count: chapters.len(),
            data: chapters.iter().map(ChapterDto::from).collect(),
        }
    }
}

/// GET /api/chapters/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    pub success: bool,
    pub data: ChapterDto,
}

/// Create / update / duplicate / delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> MutationResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedChapter {
    pub id: String,
}

/// Body of POST / PUT. Numbers may arrive as strings from HTML forms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRequest {
    pub title: Option<String>,
    pub chapter_number: Option<NumericInput>,
    pub class_number: Option<NumericInput>,
    pub unit_name: Option<String>,
    pub video_link: Option<String>,
    pub notes_link: Option<String>,
    pub questions_link: Option<String>,
}

impl From<ChapterRequest> for ChapterInput {
    fn from(req: ChapterRequest) -> Self {
        Self {
            title: req.title,
            chapter_number: req.chapter_number,
            class_number: req.class_number,
            unit_name: req.unit_name,
            video_link: req.video_link,
            notes_link: req.notes_link,
            questions_link: req.questions_link,
        }
    }
}

/// Query string of GET /api/chapters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub class_number: Option<String>,
    pub unit_name: Option<String>,
    pub search: Option<String>,
}
