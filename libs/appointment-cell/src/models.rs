use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use security_cell::AccessError;
use shared_database::StoreError;
use shared_models::error::AppError;

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub patient_id: Uuid,
    pub patient_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// The day has slots but none of them can be booked.
    pub is_full: bool,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub practitioner_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Practitioner not found")]
    PractitionerNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("No time slot exists for this practitioner, date and time")]
    SlotNotFound,

    #[error("Time slot is not available for booking")]
    SlotUnavailable,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<BookingError> for AppError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::Validation(message) => AppError::ValidationError(message),
            e @ (BookingError::PractitionerNotFound | BookingError::PatientNotFound | BookingError::SlotNotFound) => {
                AppError::NotFound(e.to_string())
            }
            e @ BookingError::SlotUnavailable => AppError::Conflict(e.to_string()),
            BookingError::Access(e) => e.into(),
            BookingError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
