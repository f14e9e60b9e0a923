//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, code::ErrorCode, field::FieldError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No valid session (missing, unknown, forged or expired)
    #[error("Login required")]
    LoginRequired,

    /// Valid session, but the identity is outside the allowed domain
    #[error("Email domain is not allowed")]
    DomainForbidden,

    /// OAuth `state` missing or mismatched on callback
    #[error("Invalid OAuth state")]
    InvalidOAuthState,

    /// Identity provider could not be reached or answered garbage
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider refused the authorization code (stale, reused or forged)
    #[error("Authorization code rejected: {0}")]
    CodeRejected(String),

    /// Another identity already owns this email
    #[error("Email is already linked to another account")]
    IdentityConflict,

    /// Bad query / body input
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::LoginRequired => ErrorKind::Unauthorized,
            AuthError::DomainForbidden => ErrorKind::Forbidden,
            AuthError::InvalidOAuthState
            | AuthError::CodeRejected(_)
            | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::ProviderUnavailable(_) => ErrorKind::BadGateway,
            AuthError::IdentityConflict => ErrorKind::Conflict,
            AuthError::Database(e) if is_store_unavailable(e) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Machine-readable code carried in the response body
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::LoginRequired => ErrorCode::LoginRequired,
            AuthError::DomainForbidden => ErrorCode::DomainForbidden,
            AuthError::InvalidOAuthState | AuthError::CodeRejected(_) => ErrorCode::AccessDenied,
            AuthError::ProviderUnavailable(_) => ErrorCode::ProviderUnavailable,
            AuthError::IdentityConflict => ErrorCode::Conflict,
            AuthError::Validation(_) => ErrorCode::ValidationFailed,
            AuthError::Database(e) if is_store_unavailable(e) => ErrorCode::StoreUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::LoginRequired => AppError::login_required(),
            AuthError::DomainForbidden => AppError::forbidden(self.to_string())
                .with_code(ErrorCode::DomainForbidden)
                .with_action("Sign in with an account from the allowed domain"),
            AuthError::Validation(errors) => AppError::validation(errors.clone()),
            // Store details stay in the log
            AuthError::Database(e) if is_store_unavailable(e) => {
                AppError::service_unavailable("Database unavailable")
            }
            AuthError::Database(_) => AppError::internal("Database error"),
            AuthError::Internal(_) => AppError::internal("Internal error"),
            _ => AppError::new(self.kind(), self.to_string()).with_code(self.code()),
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::ProviderUnavailable(msg) => {
                tracing::error!(message = %msg, "Identity provider failure");
            }
            AuthError::DomainForbidden => {
                tracing::warn!("Member-only route hit by identity outside allowed domain");
            }
            AuthError::InvalidOAuthState => {
                tracing::warn!("OAuth callback with invalid state");
            }
            AuthError::CodeRejected(msg) => {
                tracing::warn!(message = %msg, "Authorization code rejected by provider");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

/// Pool exhaustion and broken connections are 503, everything else 500
fn is_store_unavailable(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    )
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
