//! Problem Details body (RFC 7807) shared by server and client

use serde::{Deserialize, Serialize};

use super::app_error::AppError;
use super::code::ErrorCode;
use super::field::FieldError;

/// Wire representation of an [`AppError`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemBody {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl From<&AppError> for ProblemBody {
    fn from(err: &AppError) -> Self {
        Self {
            type_url: format!("https://httpstatuses.io/{}", err.status_code()),
            title: err.kind().as_str().to_string(),
            status: err.status_code(),
            detail: err.message().to_string(),
            code: err.code(),
            action: err.action().map(str::to_string),
            errors: err.field_errors().to_vec(),
        }
    }
}
