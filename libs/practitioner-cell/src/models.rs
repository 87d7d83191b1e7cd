use serde::{Deserialize, Serialize};
use thiserror::Error;

use auth_cell::AuthError;
use security_cell::AccessError;
use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePractitionerRequest {
    pub display_name: String,
    pub specialty: String,
    #[serde(default)]
    pub years_of_experience: u32,
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePractitionerRequest {
    pub display_name: Option<String>,
    pub specialty: Option<String>,
    pub years_of_experience: Option<u32>,
}

#[derive(Debug, Error)]
pub enum PractitionerError {
    #[error("Practitioner not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Practitioner still has appointments and cannot be deleted")]
    StillReferenced,

    #[error(transparent)]
    Credential(#[from] AuthError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for PractitionerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Referenced(_) => PractitionerError::StillReferenced,
            other => PractitionerError::Store(other),
        }
    }
}

impl From<PractitionerError> for AppError {
    fn from(error: PractitionerError) -> Self {
        match error {
            e @ PractitionerError::NotFound => AppError::NotFound(e.to_string()),
            PractitionerError::Validation(message) => AppError::ValidationError(message),
            e @ PractitionerError::StillReferenced => AppError::Conflict(e.to_string()),
            PractitionerError::Credential(e) => e.into(),
            PractitionerError::Access(e) => e.into(),
            PractitionerError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
