// =====================================================================================
// SECURITY CELL MODELS
// =====================================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

// =====================================================================================
// ACCESS ERRORS
// =====================================================================================

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error during access check: {0}")]
    Store(#[from] StoreError),
}

impl From<AccessError> for AppError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::Forbidden(message) => AppError::Forbidden(message),
            AccessError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

// =====================================================================================
// PASSWORD MODELS
// =====================================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Fair,
    Good,
    Strong,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordStrengthResult {
    pub strength: PasswordStrength,
    pub score: u8,
    pub issues: Vec<String>,
}

impl PasswordStrengthResult {
    pub fn is_acceptable(&self) -> bool {
        self.strength >= PasswordStrength::Fair
    }
}
