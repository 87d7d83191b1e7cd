use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::{AppointmentListQuery, AvailabilityQuery, BookAppointmentRequest};
use crate::services::BookingCoordinator;

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("{} {} booking for patient {}", principal.role, principal.id, request.patient_id);

    let coordinator = BookingCoordinator::from_state(&state);
    let appointment = coordinator.book(&principal, request).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Extension(_principal): Extension<Principal>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let coordinator = BookingCoordinator::from_state(&state);
    let availability = coordinator.availability(query).await?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let coordinator = BookingCoordinator::from_state(&state);
    let appointments = coordinator.list_appointments(&principal, query).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
