use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{AppState, ClinicStore, StoreResult};
use shared_models::auth::{Principal, Role};
use shared_models::people::{Patient, Practitioner};

use crate::jwt::TokenIssuer;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub struct TestConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub allow_unmanaged_slots: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_ttl_seconds: 3600,
            allow_unmanaged_slots: false,
        }
    }
}

impl TestConfig {
    pub fn with_unmanaged_slots() -> Self {
        Self {
            allow_unmanaged_slots: true,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            session_jwt_secret: self.jwt_secret.clone(),
            session_token_ttl_seconds: self.token_ttl_seconds,
            allow_unmanaged_slots: self.allow_unmanaged_slots,
            ..AppConfig::default()
        }
    }

    /// Fresh in-memory state per call.
    pub fn to_state(&self) -> Arc<AppState> {
        Arc::new(AppState::in_memory(self.to_app_config()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TestUser {
    pub id: Uuid,
    pub role: Role,
}

impl TestUser {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn admin() -> Self {
        Self::new(Uuid::new_v4(), Role::Admin)
    }

    pub fn practitioner(id: Uuid) -> Self {
        Self::new(id, Role::Practitioner)
    }

    pub fn patient(id: Uuid) -> Self {
        Self::new(id, Role::Patient)
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.role)
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let issuer = TokenIssuer::new(secret, 3600);
        let expires_at = Utc::now() + Duration::hours(exp_hours.unwrap_or(24));
        issuer
            .issue_at(user.id, user.role, expires_at - issuer.ttl())
            .expect("test secret must not be empty")
            .token
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    pub fn bearer(user: &TestUser) -> String {
        format!("Bearer {}", Self::create_test_token(user, TEST_JWT_SECRET, Some(1)))
    }
}

/// Seeds profile rows directly, bypassing credential registration.
pub struct TestFixtures;

impl TestFixtures {
    pub async fn practitioner(store: &dyn ClinicStore, display_name: &str) -> StoreResult<Practitioner> {
        let now = Utc::now();
        store
            .insert_practitioner(Practitioner {
                id: Uuid::new_v4(),
                display_name: display_name.to_string(),
                specialty: "General Practice".to_string(),
                years_of_experience: 7,
                credential_id: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
            })
            .await
    }

    pub async fn patient(store: &dyn ClinicStore, display_name: &str) -> StoreResult<Patient> {
        store.insert_patient(Patient::new(display_name, Uuid::new_v4())).await
    }
}
