use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::Principal;
use shared_models::error::AppError;
use shared_utils::jwt::TokenIssuer;

use crate::models::{AddDiagnosisRequest, AddPrescriptionRequest, CreatePatientRequest, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Patient signup");

    let service = PatientService::new(state.store.clone());
    let response = service
        .signup(request, &TokenIssuer::from_config(&state.config))
        .await?;

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.store.clone());
    let patient = service.create_patient(&principal, request).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.store.clone());
    let patient = service.get_patient(&principal, patient_id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.store.clone());
    let patient = service.update_patient(&principal, patient_id, request).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn add_prescription(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<AddPrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.store.clone());
    let patient = service.add_prescription(&principal, patient_id, request).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn add_diagnosis(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<AddDiagnosisRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.store.clone());
    let patient = service.add_diagnosis(&principal, patient_id, request).await?;

    Ok(Json(json!(patient)))
}
