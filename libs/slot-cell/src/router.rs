use std::sync::Arc;

use axum::{
    middleware,
    routing::{patch, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn slot_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_slots).get(handlers::list_slots))
        .route("/{slot_id}/status", patch(handlers::update_slot_status))
        .route("/{slot_id}/approve", post(handlers::approve_slot))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
