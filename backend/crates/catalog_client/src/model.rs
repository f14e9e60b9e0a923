//! Wire Models
//!
//! The client's view of the catalog API. Kept separate from the server
//! crate so the client builds without the server stack.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Classes the catalog accepts
pub const ALLOWED_CLASSES: [u8; 2] = [9, 10];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub id: String,
    pub title: String,
    pub chapter_number: f64,
    pub class_number: u8,
    pub unit_name: String,
    #[serde(default)]
    pub video_link: Option<String>,
    #[serde(default)]
    pub notes_link: Option<String>,
    #[serde(default)]
    pub questions_link: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of create / update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPayload {
    pub title: String,
    pub chapter_number: f64,
    pub class_number: u8,
    pub unit_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions_link: Option<String>,
}

/// Listing filter; also the client cache key
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListingQuery {
    pub class_number: Option<u8>,
    pub unit_name: Option<String>,
    pub search: Option<String>,
}

impl ListingQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn class(class_number: u8) -> Self {
        Self {
            class_number: Some(class_number),
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit_name: impl Into<String>) -> Self {
        self.unit_name = Some(unit_name.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Reject classes the server would reject anyway, without a round trip
    pub fn validate(&self) -> Result<(), FetchError> {
        match self.class_number {
            Some(class) if !ALLOWED_CLASSES.contains(&class) => Err(FetchError::InvalidFilter(
                format!("classNumber must be 9 or 10, got {class}"),
            )),
            _ => Ok(()),
        }
    }

    /// Query-string pairs, blank values left out
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(class) = self.class_number {
            pairs.push(("classNumber", class.to_string()));
        }
        if let Some(unit) = self.unit_name.as_deref().filter(|u| !u.trim().is_empty()) {
            pairs.push(("unitName", unit.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// `{ success, count, data }`
#[derive(Debug, Clone, Deserialize)]
pub struct ListingEnvelope {
    #[serde(default)]
    pub count: Option<usize>,
    pub data: Vec<ChapterRecord>,
}

/// `{ success, message?, data }`
#[derive(Debug, Clone, Deserialize)]
pub struct ItemEnvelope<T> {
    pub data: T,
}
