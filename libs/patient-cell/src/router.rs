use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/signup", post(signup));

    let protected_routes = Router::new()
        .route("/", post(create_patient))
        .route("/{patient_id}", get(get_patient).put(update_patient))
        .route("/{patient_id}/prescriptions", post(add_prescription))
        .route("/{patient_id}/diagnoses", post(add_diagnosis))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
