use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::appointment_routes;
use auth_cell::auth_routes;
use patient_cell::patient_routes;
use practitioner_cell::practitioner_routes;
use shared_database::AppState;
use slot_cell::slot_routes;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic portal API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/slots", slot_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/practitioners", practitioner_routes(state.clone()))
        .nest("/patients", patient_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use shared_utils::test_utils::TestConfig;

    #[tokio::test]
    async fn root_is_public() {
        let response = create_router(TestConfig::default().to_state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Clinic portal API is running!");
    }

    #[tokio::test]
    async fn cell_routes_are_mounted_behind_authentication() {
        let router = create_router(TestConfig::default().to_state());

        for uri in ["/appointments", "/practitioners", "/slots?practitioner_id=00000000-0000-0000-0000-000000000000"] {
            let response = router
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }
}
