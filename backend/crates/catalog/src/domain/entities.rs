//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::ChapterId;

use crate::domain::value_objects::{ChapterNumber, ClassNumber};

/// Suffix appended to the title of a duplicated chapter
pub const COPY_SUFFIX: &str = " (Copy)";

/// Validated chapter fields, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterDraft {
    pub title: String,
    pub chapter_number: ChapterNumber,
    pub class_number: ClassNumber,
    pub unit_name: String,
    pub video_link: Option<String>,
    pub notes_link: Option<String>,
    pub questions_link: Option<String>,
}

/// One unit of course material
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub chapter_id: ChapterId,
    pub title: String,
    pub chapter_number: ChapterNumber,
    pub class_number: ClassNumber,
    pub unit_name: String,
    /// Absent links are `None`, never an empty string
    pub video_link: Option<String>,
    pub notes_link: Option<String>,
    pub questions_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(draft: ChapterDraft, now: DateTime<Utc>) -> Self {
        Self {
            chapter_id: ChapterId::new(),
            title: draft.title,
            chapter_number: draft.chapter_number,
            class_number: draft.class_number,
            unit_name: draft.unit_name,
            video_link: draft.video_link,
            notes_link: draft.notes_link,
            questions_link: draft.questions_link,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field (PUT semantics)
    pub fn apply(&mut self, draft: ChapterDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.chapter_number = draft.chapter_number;
        self.class_number = draft.class_number;
        self.unit_name = draft.unit_name;
        self.video_link = draft.video_link;
        self.notes_link = draft.notes_link;
        self.questions_link = draft.questions_link;
        self.updated_at = now;
    }

    /// New chapter right after this one, titled as a copy
    pub fn duplicate(&self, now: DateTime<Utc>) -> Self {
        Self {
            chapter_id: ChapterId::new(),
            title: format!("{}{}", self.title, COPY_SUFFIX),
            chapter_number: self.chapter_number.next_duplicate(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}
