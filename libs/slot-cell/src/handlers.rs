use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::{CreateSlotsRequest, SlotQuery, UpdateSlotStatusRequest};
use crate::services::SlotRegistryService;

#[axum::debug_handler]
pub async fn create_slots(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    let registry = SlotRegistryService::new(state.store.clone());
    let slots = registry.create(&principal, request).await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let registry = SlotRegistryService::new(state.store.clone());
    let slots = registry.list(&principal, query).await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn update_slot_status(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<UpdateSlotStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let registry = SlotRegistryService::new(state.store.clone());
    let slot = registry.set_status(&principal, slot_id, request.status).await?;

    Ok(Json(json!(slot)))
}

#[axum::debug_handler]
pub async fn approve_slot(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let registry = SlotRegistryService::new(state.store.clone());
    let slot = registry.approve(&principal, slot_id).await?;

    Ok(Json(json!(slot)))
}
