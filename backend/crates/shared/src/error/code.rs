//! Error Code - machine-readable error identifiers
//!
//! Codes are part of the wire contract: clients switch on them to decide
//! between "redirect to login", "show offline banner" and inline validation.

use serde::{Deserialize, Serialize};

/// 機械可読なエラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No valid session; the client must send the user to the login entry point
    LoginRequired,
    /// Session is valid but the identity is outside the allowed email domain
    DomainForbidden,
    /// Federated login was rejected because of the email domain
    AccessDenied,
    /// The identity provider could not be reached or answered garbage
    ProviderUnavailable,
    /// Input failed field validation
    ValidationFailed,
    /// Malformed resource identifier
    InvalidId,
    NotFound,
    Conflict,
    Internal,
    StoreUnavailable,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::LoginRequired => "LOGIN_REQUIRED",
            ErrorCode::DomainForbidden => "DOMAIN_FORBIDDEN",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidId => "INVALID_ID",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
