use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use auth_cell::{auth_routes, CredentialService};
use shared_models::auth::Role;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser, TEST_JWT_SECRET};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, authorization: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn login_returns_token_role_and_expiry() {
    let state = TestConfig::default().to_state();
    CredentialService::new(state.store.clone())
        .register(Role::Admin, Uuid::new_v4(), "root@clinic.test", "Correct-Horse-9")
        .await
        .unwrap();

    let response = auth_routes(state)
        .oneshot(post(
            "/login",
            None,
            json!({ "identifier": "root@clinic.test", "password": "Correct-Horse-9" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["role"], "admin");
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn failed_login_is_401_with_generic_message() {
    let state = TestConfig::default().to_state();

    let response = auth_routes(state)
        .oneshot(post(
            "/login",
            None,
            json!({ "identifier": "ghost@clinic.test", "password": "Correct-Horse-9" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");
}

#[tokio::test]
async fn validate_reports_the_principal() {
    let user = TestUser::patient(Uuid::new_v4());
    let bearer = JwtTestUtils::bearer(&user);

    let response = auth_routes(TestConfig::default().to_state())
        .oneshot(post("/validate", Some(&bearer), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["principal_id"], user.id.to_string());
    assert_eq!(body["role"], "patient");
}

#[tokio::test]
async fn validate_rejects_expired_and_missing_tokens() {
    let user = TestUser::admin();
    let expired = format!("Bearer {}", JwtTestUtils::create_expired_token(&user, TEST_JWT_SECRET));
    let router = auth_routes(TestConfig::default().to_state());

    let response = router
        .clone()
        .oneshot(post("/validate", Some(&expired), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router.oneshot(post("/validate", None, json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Missing authorization header");
}

#[tokio::test]
async fn verify_answers_false_for_a_forged_token() {
    let user = TestUser::admin();
    let forged = format!("Bearer {}", JwtTestUtils::create_invalid_signature_token(&user));

    let response = auth_routes(TestConfig::default().to_state())
        .oneshot(post("/verify", Some(&forged), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["valid"], false);
}
