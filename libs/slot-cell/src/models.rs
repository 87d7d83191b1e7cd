use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use security_cell::AccessError;
use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::scheduling::SlotStatus;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotsRequest {
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
    pub times: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSlotStatusRequest {
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub practitioner_id: Uuid,
    pub date: Option<NaiveDate>,
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotTransition {
    Approve,
    Freeze,
    Unfreeze,
    Book,
}

impl fmt::Display for SlotTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            SlotTransition::Approve => "approve",
            SlotTransition::Freeze => "freeze",
            SlotTransition::Unfreeze => "unfreeze",
            SlotTransition::Book => "book",
        };
        f.write_str(verb)
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Time slot not found")]
    NotFound,

    #[error("Practitioner not found")]
    PractitionerNotFound,

    #[error("Cannot {transition} a slot in {current} status")]
    InvalidState {
        current: SlotStatus,
        transition: SlotTransition,
    },

    #[error("Slot belongs to another practitioner")]
    NotOwner,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slot is being modified concurrently, retry the request")]
    Contended,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<SlotError> for AppError {
    fn from(error: SlotError) -> Self {
        match error {
            e @ (SlotError::NotFound | SlotError::PractitionerNotFound) => AppError::NotFound(e.to_string()),
            e @ SlotError::InvalidState { .. } => AppError::InvalidState(e.to_string()),
            e @ SlotError::NotOwner => AppError::Forbidden(e.to_string()),
            SlotError::Validation(message) => AppError::ValidationError(message),
            e @ SlotError::Contended => AppError::Conflict(e.to_string()),
            SlotError::Access(e) => e.into(),
            SlotError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
