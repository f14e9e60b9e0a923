//! Client Error Types
//!
//! [`SourceError`] is what a single round trip can produce. [`FetchError`]
//! is the terminal outcome handed to the UI after offline checks and
//! retries, mapped onto one of three reactions by [`FetchError::user_action`].

use kernel::error::{code::ErrorCode, field::FieldError, problem::ProblemBody};
use platform::retry::{RetryError, Retryable};
use thiserror::Error;

/// Failure of one attempt against the catalog source
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// 401: the session is missing or expired
    #[error("login required")]
    Unauthorized,

    /// 403: signed in, but not allowed
    #[error("forbidden")]
    Forbidden,

    /// Connection refused, reset or timed out
    #[error("network error: {0}")]
    Network(String),

    /// 5xx from the server
    #[error("server error {status}")]
    Server { status: u16 },

    /// Any other 4xx: the request itself is wrong
    #[error("rejected with {status}: {}", .problem.detail)]
    Rejected { status: u16, problem: ProblemBody },

    /// 2xx with a body we cannot read
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Flag went offline between attempts
    #[error("offline")]
    Offline,
}

impl Retryable for SourceError {
    fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Network(_) | SourceError::Server { .. })
    }
}

/// How a UI should react to a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    RedirectToLogin,
    ShowOfflineBanner,
    ShowError,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Login required")]
    NotAuthenticated,

    #[error("Access forbidden")]
    Forbidden,

    /// The connectivity flag was off; the network was never touched
    #[error("You are offline")]
    Offline,

    /// Network failures persisted past the retry bound
    #[error("Server unreachable after {attempts} attempts: {last}")]
    Unreachable { attempts: u32, last: String },

    /// 5xx persisted past the retry bound
    #[error("Server failed after {attempts} attempts (status {status})")]
    ServerUnavailable { attempts: u32, status: u16 },

    /// The server refused the request (validation, unknown id, ...)
    #[error("Request rejected ({status}): {detail}")]
    Rejected {
        status: u16,
        code: Option<ErrorCode>,
        detail: String,
        errors: Vec<FieldError>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Caller-side input error, caught before any request
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn user_action(&self) -> UserAction {
        match self {
            FetchError::NotAuthenticated => UserAction::RedirectToLogin,
            FetchError::Offline | FetchError::Unreachable { .. } => UserAction::ShowOfflineBanner,
            _ => UserAction::ShowError,
        }
    }

    /// Field errors to show inline, if the server sent any
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            FetchError::Rejected { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<SourceError> for FetchError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unauthorized => FetchError::NotAuthenticated,
            SourceError::Forbidden => FetchError::Forbidden,
            SourceError::Offline => FetchError::Offline,
            SourceError::Network(last) => FetchError::Unreachable { attempts: 1, last },
            SourceError::Server { status } => FetchError::ServerUnavailable {
                attempts: 1,
                status,
            },
            SourceError::Rejected { status, problem } => FetchError::Rejected {
                status,
                code: problem.code,
                detail: problem.detail,
                errors: problem.errors,
            },
            SourceError::InvalidResponse(msg) => FetchError::InvalidResponse(msg),
        }
    }
}

impl From<RetryError<SourceError>> for FetchError {
    fn from(err: RetryError<SourceError>) -> Self {
        match err {
            RetryError::Cancelled => FetchError::Cancelled,
            RetryError::Aborted(source) => source.into(),
            RetryError::Exhausted { attempts, last } => match last {
                SourceError::Network(last) => FetchError::Unreachable { attempts, last },
                SourceError::Server { status } => FetchError::ServerUnavailable { attempts, status },
                other => other.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_and_5xx_are_retryable() {
        assert!(SourceError::Network("reset".into()).is_retryable());
        assert!(SourceError::Server { status: 503 }.is_retryable());
        assert!(!SourceError::Unauthorized.is_retryable());
        assert!(!SourceError::Offline.is_retryable());
    }

    #[test]
    fn test_exhausted_network_is_offline_banner() {
        let err: FetchError = RetryError::Exhausted {
            attempts: 3,
            last: SourceError::Network("refused".into()),
        }
        .into();
        assert!(matches!(err, FetchError::Unreachable { attempts: 3, .. }));
        assert_eq!(err.user_action(), UserAction::ShowOfflineBanner);
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let err: FetchError = RetryError::Aborted(SourceError::Unauthorized).into();
        assert_eq!(err.user_action(), UserAction::RedirectToLogin);
    }

    #[test]
    fn test_rejection_keeps_field_errors() {
        let problem = ProblemBody {
            type_url: "https://httpstatuses.io/400".into(),
            title: "Bad Request".into(),
            status: 400,
            detail: "Validation failed".into(),
            code: Some(ErrorCode::ValidationFailed),
            action: None,
            errors: vec![FieldError::required("title")],
        };
        let err: FetchError = SourceError::Rejected {
            status: 400,
            problem,
        }
        .into();
        assert_eq!(err.user_action(), UserAction::ShowError);
        assert_eq!(err.field_errors()[0].field, "title");
    }
}
