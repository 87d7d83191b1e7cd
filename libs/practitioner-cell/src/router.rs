use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn practitioner_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_practitioner).get(handlers::list_practitioners))
        .route(
            "/{practitioner_id}",
            get(handlers::get_practitioner)
                .put(handlers::update_practitioner)
                .delete(handlers::delete_practitioner),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
