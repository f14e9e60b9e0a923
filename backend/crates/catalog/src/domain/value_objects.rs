//! Domain Value Objects
//!
//! Immutable value types for the catalog domain.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Class a chapter belongs to. Only two classes are taught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassNumber {
    Nine,
    Ten,
}

impl ClassNumber {
    pub const ALLOWED: [ClassNumber; 2] = [ClassNumber::Nine, ClassNumber::Ten];

    pub fn new(value: i64) -> Option<Self> {
        match value {
            9 => Some(ClassNumber::Nine),
            10 => Some(ClassNumber::Ten),
            _ => None,
        }
    }

    /// Accepts `9` / `10` and their float spellings (`9.0`), nothing fractional
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.fract() != 0.0 {
            return None;
        }
        Self::new(value as i64)
    }

    pub fn value(&self) -> i16 {
        match self {
            ClassNumber::Nine => 9,
            ClassNumber::Ten => 10,
        }
    }
}

impl fmt::Display for ClassNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for ClassNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.value())
    }
}

/// Ordinal of a chapter within its class.
///
/// Not necessarily an integer: duplicating chapter 3 yields 3.5.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ChapterNumber(f64);

impl ChapterNumber {
    /// Offset applied when a chapter is duplicated
    pub const DUPLICATE_STEP: f64 = 0.5;

    /// Finite and strictly positive
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Trusted value read back from storage
    pub fn from_db(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn next_duplicate(&self) -> Self {
        Self(self.0 + Self::DUPLICATE_STEP)
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A number as submitted by forms: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// `None` for blank strings and anything that is not a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericInput::Number(n) => Some(*n),
            NumericInput::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, NumericInput::Text(s) if s.trim().is_empty())
    }
}

/// Listing filter; also the listing cache key.
///
/// Blank values are dropped and search text is lowercased, so equivalent
/// requests share one cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ChapterFilter {
    pub class_number: Option<ClassNumber>,
    pub unit_name: Option<String>,
    pub search: Option<String>,
}

impl ChapterFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(
        class_number: Option<ClassNumber>,
        unit_name: Option<&str>,
        search: Option<&str>,
    ) -> Self {
        Self {
            class_number,
            unit_name: non_blank(unit_name).map(str::to_string),
            search: non_blank(search).map(str::to_lowercase),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.class_number.is_none() && self.unit_name.is_none() && self.search.is_none()
    }
}

/// Trimmed text, `None` when nothing is left
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
