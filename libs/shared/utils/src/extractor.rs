use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::jwt::TokenIssuer;

/// Verifies the bearer token and attaches the resulting `Principal` to the
/// request. Handlers take it back out with `Extension<Principal>`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state)
            .await
            .map_err(|_| AppError::Unauthenticated("Missing or malformed authorization header".to_string()))?;

    let principal = TokenIssuer::from_config(&state.config)
        .verify(bearer.token())
        .map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            AppError::from(e)
        })?;

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

pub fn extract_principal<B>(request: &Request<B>) -> Result<Principal, AppError> {
    request
        .extensions()
        .get::<Principal>()
        .copied()
        .ok_or_else(|| AppError::Unauthenticated("Principal not found in request extensions".to_string()))
}
