use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use auth_cell::AuthError;
use security_cell::AccessError;
use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::people::Patient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub display_name: String,
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub patient: Patient,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPrescriptionRequest {
    pub medication: String,
    pub dosage: String,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDiagnosisRequest {
    pub description: String,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Credential(#[from] AuthError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(error: PatientError) -> Self {
        match error {
            e @ PatientError::NotFound => AppError::NotFound(e.to_string()),
            PatientError::Validation(message) => AppError::ValidationError(message),
            PatientError::Credential(e) => e.into(),
            PatientError::Access(e) => e.into(),
            PatientError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
