use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

/// Every auth route is public; each handler reads its own credentials.
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/validate", post(handlers::validate_token))
        .route("/verify", post(handlers::verify_token))
        .with_state(state)
}
