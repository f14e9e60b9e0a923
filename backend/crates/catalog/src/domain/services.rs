//! Domain Services
//!
//! Field validation for chapter input and listing filters. Every problem is
//! collected so a form can show all of them at once.

use kernel::error::field::{FieldError, FieldErrors};

use crate::domain::entities::ChapterDraft;
use crate::domain::value_objects::{
    ChapterFilter, ChapterNumber, ClassNumber, NumericInput, non_blank,
};

pub const TITLE_MAX_LENGTH: usize = 200;
pub const UNIT_NAME_MAX_LENGTH: usize = 200;
pub const LINK_MAX_LENGTH: usize = 2048;

/// Unvalidated chapter fields as submitted
#[derive(Debug, Clone, Default)]
pub struct ChapterInput {
    pub title: Option<String>,
    pub chapter_number: Option<NumericInput>,
    pub class_number: Option<NumericInput>,
    pub unit_name: Option<String>,
    pub video_link: Option<String>,
    pub notes_link: Option<String>,
    pub questions_link: Option<String>,
}

pub fn validate_chapter(input: &ChapterInput) -> Result<ChapterDraft, Vec<FieldError>> {
    let mut errors = FieldErrors::new();

    let title = required_text(&mut errors, "title", input.title.as_deref(), TITLE_MAX_LENGTH);
    let unit_name = required_text(
        &mut errors,
        "unitName",
        input.unit_name.as_deref(),
        UNIT_NAME_MAX_LENGTH,
    );

    let chapter_number = match input.chapter_number.as_ref().filter(|n| !n.is_blank()) {
        None => {
            errors.push(FieldError::required("chapterNumber"));
            None
        }
        Some(raw) => {
            let parsed = raw.as_f64().and_then(ChapterNumber::new);
            if parsed.is_none() {
                errors.push(FieldError::new(
                    "chapterNumber",
                    "chapterNumber must be a positive number",
                ));
            }
            parsed
        }
    };

    let class_number = match input.class_number.as_ref().filter(|n| !n.is_blank()) {
        None => {
            errors.push(FieldError::required("classNumber"));
            None
        }
        Some(raw) => {
            let parsed = raw.as_f64().and_then(ClassNumber::from_f64);
            if parsed.is_none() {
                errors.push(class_number_error());
            }
            parsed
        }
    };

    let video_link = optional_link(&mut errors, "videoLink", input.video_link.as_deref());
    let notes_link = optional_link(&mut errors, "notesLink", input.notes_link.as_deref());
    let questions_link =
        optional_link(&mut errors, "questionsLink", input.questions_link.as_deref());

    match (title, chapter_number, class_number, unit_name) {
        (Some(title), Some(chapter_number), Some(class_number), Some(unit_name)) => errors
            .finish(ChapterDraft {
                title,
                chapter_number,
                class_number,
                unit_name,
                video_link,
                notes_link,
                questions_link,
            }),
        _ => Err(errors.into_vec()),
    }
}

/// Build a listing filter from raw query values.
///
/// An unknown class is a caller error, reported like any other field error.
pub fn parse_filter(
    class_number: Option<&str>,
    unit_name: Option<&str>,
    search: Option<&str>,
) -> Result<ChapterFilter, Vec<FieldError>> {
    let mut errors = FieldErrors::new();

    let class_number = match non_blank(class_number) {
        None => None,
        Some(raw) => {
            let parsed = raw.parse::<f64>().ok().and_then(ClassNumber::from_f64);
            if parsed.is_none() {
                errors.push(class_number_error());
            }
            parsed
        }
    };

    errors.finish(ChapterFilter::new(class_number, unit_name, search))
}

fn class_number_error() -> FieldError {
    let allowed = ClassNumber::ALLOWED
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    FieldError::new("classNumber", format!("classNumber must be {allowed}"))
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Option<String> {
    match non_blank(value) {
        None => {
            errors.push(FieldError::required(field));
            None
        }
        Some(text) if text.chars().count() > max => {
            errors.push(FieldError::new(
                field,
                format!("{field} must be at most {max} characters"),
            ));
            None
        }
        Some(text) => Some(text.to_string()),
    }
}

/// Blank links are stored as absent
fn optional_link(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let link = non_blank(value)?;
    if link.len() > LINK_MAX_LENGTH {
        errors.push(FieldError::new(
            field,
            format!("{field} must be at most {LINK_MAX_LENGTH} characters"),
        ));
        return None;
    }
    Some(link.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ChapterInput {
        ChapterInput {
            title: Some("  Kinematics ".into()),
            chapter_number: Some(NumericInput::Number(1.0)),
            class_number: Some(NumericInput::Text("10".into())),
            unit_name: Some("Mechanics".into()),
            ..Default::default()
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let draft = validate_chapter(&input()).unwrap();
        assert_eq!(draft.title, "Kinematics");
        assert_eq!(draft.class_number, ClassNumber::Ten);
        assert_eq!(draft.chapter_number.value(), 1.0);
    }

    #[test]
    fn test_every_missing_field_is_reported() {
        let errors = validate_chapter(&ChapterInput::default()).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["title", "unitName", "chapterNumber", "classNumber"]
        );
    }

    #[test]
    fn test_class_outside_allowed_set() {
        let errors = validate_chapter(&ChapterInput {
            class_number: Some(NumericInput::Number(11.0)),
            ..input()
        })
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "classNumber must be 9 or 10");
    }

    #[test]
    fn test_blank_links_become_absent() {
        let draft = validate_chapter(&ChapterInput {
            video_link: Some("".into()),
            notes_link: Some("   ".into()),
            questions_link: Some(" https://q.test/1 ".into()),
            ..input()
        })
        .unwrap();
        assert_eq!(draft.video_link, None);
        assert_eq!(draft.notes_link, None);
        assert_eq!(draft.questions_link.as_deref(), Some("https://q.test/1"));
    }

    #[test]
    fn test_non_numeric_chapter_number() {
        let errors = validate_chapter(&ChapterInput {
            chapter_number: Some(NumericInput::Text("one".into())),
            ..input()
        })
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["chapterNumber"]);
    }

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter(Some("9"), None, Some("Motion")).unwrap();
        assert_eq!(filter.class_number, Some(ClassNumber::Nine));
        assert_eq!(filter.search.as_deref(), Some("motion"));

        assert!(parse_filter(Some(""), None, None).unwrap().is_unfiltered());
        assert_eq!(
            fields(&parse_filter(Some("12"), None, None).unwrap_err()),
            vec!["classNumber"]
        );
    }
}
