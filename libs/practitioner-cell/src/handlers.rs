use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::{CreatePractitionerRequest, UpdatePractitionerRequest};
use crate::services::PractitionerService;

#[axum::debug_handler]
pub async fn create_practitioner(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreatePractitionerRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PractitionerService::new(state.store.clone());
    let practitioner = service.create_practitioner(&principal, request).await?;

    Ok(Json(json!(practitioner)))
}

#[axum::debug_handler]
pub async fn list_practitioners(
    State(state): State<Arc<AppState>>,
    Extension(_principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let service = PractitionerService::new(state.store.clone());
    let practitioners = service.list_practitioners().await?;

    Ok(Json(json!(practitioners)))
}

#[axum::debug_handler]
pub async fn get_practitioner(
    State(state): State<Arc<AppState>>,
    Extension(_principal): Extension<Principal>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PractitionerService::new(state.store.clone());
    let practitioner = service.get_practitioner(practitioner_id).await?;

    Ok(Json(json!(practitioner)))
}

#[axum::debug_handler]
pub async fn update_practitioner(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(practitioner_id): Path<Uuid>,
    Json(request): Json<UpdatePractitionerRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PractitionerService::new(state.store.clone());
    let practitioner = service
        .update_practitioner(&principal, practitioner_id, request)
        .await?;

    Ok(Json(json!(practitioner)))
}

#[axum::debug_handler]
pub async fn delete_practitioner(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PractitionerService::new(state.store.clone());
    service.delete_practitioner(&principal, practitioner_id).await?;

    Ok(Json(json!({ "deleted": true })))
}
