//! Error types for the accounts core.

use thiserror::Error;

use crate::entities::ApplicationStatus;

/// Errors surfaced by the credential provider and the document stores.
#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("record not found")]
    NotFound,

    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out")]
    Timeout,
}

/// Session-level errors. Propagate to callers unmodified.
#[derive(Debug, Error, Clone)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("provisioning failed: {0}")]
    Provisioning(String),

    #[error("profile not found")]
    ProfileNotFound,

    #[error("credential provider error: {0}")]
    Provider(String),

    #[error("credential provider timed out")]
    Timeout,
}

/// Errors raised by the promotion workflow.
#[derive(Debug, Error, Clone)]
pub enum ReviewError {
    #[error("application not found")]
    ApplicationNotFound,

    #[error("application already reviewed as {0}")]
    AlreadyReviewed(ApplicationStatus),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Identity creation was rejected. When `application_updated` is true
    /// the application record has already been marked approved and now has
    /// no backing account; the caller must re-drive provisioning or flag
    /// the record for an operator.
    #[error("provisioning failed: {reason}")]
    Provisioning {
        reason: String,
        application_updated: bool,
    },

    #[error("store error: {0}")]
    Store(String),
}

/// Result types for account operations
pub type ProviderResult<T> = Result<T, ProviderError>;
pub type AuthResult<T> = Result<T, AuthError>;
pub type ReviewResult<T> = Result<T, ReviewError>;

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidCredentials => AuthError::InvalidCredentials,
            ProviderError::EmailTaken => {
                AuthError::Provisioning("email already registered".to_string())
            }
            ProviderError::NotFound => AuthError::ProfileNotFound,
            ProviderError::Timeout => AuthError::Timeout,
            ProviderError::DeliveryFailed(message) | ProviderError::Unavailable(message) => {
                AuthError::Provider(message)
            }
        }
    }
}
