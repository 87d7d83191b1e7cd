use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_utils::jwt::TokenError;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Password too weak: {}", .0.join("; "))]
    WeakPassword(Vec<String>),

    #[error("Identifier already registered for this role")]
    DuplicateIdentifier,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(_) => AuthError::DuplicateIdentifier,
            other => AuthError::Store(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()),
            AuthError::Validation(message) => AppError::ValidationError(message),
            e @ AuthError::WeakPassword(_) => AppError::ValidationError(e.to_string()),
            e @ AuthError::DuplicateIdentifier => AppError::Conflict(e.to_string()),
            // An unusable secret is a deployment fault, not a client one.
            AuthError::Token(e) => e.into(),
            AuthError::Hashing(e) => AppError::Internal(e),
            AuthError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
