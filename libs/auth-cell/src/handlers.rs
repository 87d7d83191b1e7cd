use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::{LoginRequest, LoginResponse, TokenResponse};
use shared_models::error::AppError;
use shared_utils::jwt::TokenIssuer;

use crate::models::AuthError;
use crate::services::LoginService;

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthenticated("Invalid authorization header format".to_string()))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    debug!("Login attempt");

    let service = LoginService::new(state.store.clone(), TokenIssuer::from_config(&state.config));
    let response = service.login(&request).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let principal = TokenIssuer::from_config(&state.config)
        .verify(&token)
        .map_err(AuthError::from)?;

    Ok(Json(TokenResponse {
        valid: true,
        principal_id: principal.id,
        role: principal.role,
    }))
}

#[axum::debug_handler]
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;
    let valid = TokenIssuer::from_config(&state.config).verify(&token).is_ok();

    Ok(Json(json!({ "valid": valid })))
}
