//! Catalog Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, code::ErrorCode, field::FieldError, kind::ErrorKind};
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Path id is not a UUID
    #[error("Invalid chapter ID")]
    InvalidId,

    #[error("Chapter not found")]
    NotFound,

    /// Body or query failed field validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidId | CatalogError::Validation(_) => ErrorKind::BadRequest,
            CatalogError::NotFound => ErrorKind::NotFound,
            CatalogError::Database(e) if is_store_unavailable(e) => ErrorKind::ServiceUnavailable,
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::InvalidId => ErrorCode::InvalidId,
            CatalogError::NotFound => ErrorCode::NotFound,
            CatalogError::Validation(_) => ErrorCode::ValidationFailed,
            CatalogError::Database(e) if is_store_unavailable(e) => ErrorCode::StoreUnavailable,
            CatalogError::Database(_) | CatalogError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            CatalogError::InvalidId => {
                AppError::bad_request(self.to_string()).with_code(ErrorCode::InvalidId)
            }
            CatalogError::NotFound => AppError::not_found(self.to_string()),
            CatalogError::Validation(errors) => AppError::validation(errors.clone()),
            CatalogError::Database(e) if is_store_unavailable(e) => {
                AppError::service_unavailable("Database unavailable")
            }
            CatalogError::Database(_) => AppError::internal("Database error"),
            CatalogError::Internal(_) => AppError::internal("Internal error"),
        }
    }

    pub(crate) fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::Validation(errors) => {
                tracing::debug!(fields = errors.len(), "Chapter input rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

fn is_store_unavailable(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    )
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_is_400_with_its_own_code() {
        let err = CatalogError::InvalidId;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_app_error().code(), Some(ErrorCode::InvalidId));
    }

    #[test]
    fn test_validation_keeps_field_detail() {
        let err = CatalogError::Validation(vec![FieldError::required("title")]);
        let app = err.to_app_error();
        assert_eq!(app.code(), Some(ErrorCode::ValidationFailed));
        assert_eq!(app.field_errors()[0].field, "title");
    }

    #[test]
    fn test_database_detail_is_not_leaked() {
        let err = CatalogError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_app_error().message(), "Database error");
    }
}
