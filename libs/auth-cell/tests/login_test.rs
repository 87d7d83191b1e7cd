use std::sync::Arc;

use assert_matches::assert_matches;
use uuid::Uuid;

use auth_cell::{AuthError, CredentialService, LoginService};
use shared_database::{ClinicStore, MemoryStore};
use shared_models::auth::{LoginRequest, Role};
use shared_utils::jwt::TokenIssuer;
use shared_utils::test_utils::{TestFixtures, TEST_JWT_SECRET};

const ADMIN_PASSWORD: &str = "Correct-Horse-9";
const PATIENT_PASSWORD: &str = "Battery-Staple-7";

fn services(store: Arc<dyn ClinicStore>) -> (CredentialService, LoginService) {
    (
        CredentialService::new(store.clone()),
        LoginService::new(store, TokenIssuer::new(TEST_JWT_SECRET, 3600)),
    )
}

fn request(identifier: &str, password: &str) -> LoginRequest {
    LoginRequest {
        identifier: identifier.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_issues_a_token_for_the_matching_principal() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let practitioner = TestFixtures::practitioner(store.as_ref(), "Dr. Quinn").await.unwrap();
    let (credentials, login) = services(store);

    credentials
        .register(Role::Practitioner, practitioner.id, "quinn@clinic.test", ADMIN_PASSWORD)
        .await
        .unwrap();

    let response = login.login(&request("  Quinn@Clinic.TEST ", ADMIN_PASSWORD)).await.unwrap();

    assert_eq!(response.role, Role::Practitioner);
    assert_eq!(response.principal.id, practitioner.id);
    assert_eq!(response.principal.display_name.as_deref(), Some("Dr. Quinn"));

    let principal = TokenIssuer::new(TEST_JWT_SECRET, 3600).verify(&response.token).unwrap();
    assert_eq!(principal.id, practitioner.id);
    assert_eq!(principal.role, Role::Practitioner);
}

#[tokio::test]
async fn namespaces_are_tried_admin_first_and_fall_through_on_mismatch() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let patient = TestFixtures::patient(store.as_ref(), "Ada Lovelace").await.unwrap();
    let (credentials, login) = services(store);

    let admin = credentials
        .register(Role::Admin, Uuid::new_v4(), "shared@clinic.test", ADMIN_PASSWORD)
        .await
        .unwrap();
    credentials
        .register(Role::Patient, patient.id, "shared@clinic.test", PATIENT_PASSWORD)
        .await
        .unwrap();

    let as_admin = login.login(&request("shared@clinic.test", ADMIN_PASSWORD)).await.unwrap();
    assert_eq!(as_admin.role, Role::Admin);
    assert_eq!(as_admin.principal.id, admin.principal_id);
    assert_eq!(as_admin.principal.display_name, None);

    let as_patient = login.login(&request("shared@clinic.test", PATIENT_PASSWORD)).await.unwrap();
    assert_eq!(as_patient.role, Role::Patient);
    assert_eq!(as_patient.principal.id, patient.id);
}

#[tokio::test]
async fn unknown_identifier_and_wrong_password_fail_the_same_way() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let (credentials, login) = services(store);
    credentials
        .register(Role::Admin, Uuid::new_v4(), "root@clinic.test", ADMIN_PASSWORD)
        .await
        .unwrap();

    assert_matches!(
        login.login(&request("root@clinic.test", "Wrong-Horse-9")).await,
        Err(AuthError::InvalidCredentials)
    );
    assert_matches!(
        login.login(&request("nobody@clinic.test", ADMIN_PASSWORD)).await,
        Err(AuthError::InvalidCredentials)
    );
    assert_matches!(
        login.login(&request("   ", ADMIN_PASSWORD)).await,
        Err(AuthError::Validation(_))
    );
}

#[tokio::test]
async fn registration_rejects_weak_passwords_and_duplicates_per_namespace() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let (credentials, _) = services(store);

    assert_matches!(
        credentials.register(Role::Patient, Uuid::new_v4(), "ada@clinic.test", "short").await,
        Err(AuthError::WeakPassword(_))
    );

    credentials
        .register(Role::Patient, Uuid::new_v4(), "ada@clinic.test", PATIENT_PASSWORD)
        .await
        .unwrap();

    assert_matches!(
        credentials
            .register(Role::Patient, Uuid::new_v4(), "ADA@clinic.test", PATIENT_PASSWORD)
            .await,
        Err(AuthError::DuplicateIdentifier)
    );

    // Same identifier in another namespace is a separate credential.
    assert!(credentials
        .register(Role::Practitioner, Uuid::new_v4(), "ada@clinic.test", PATIENT_PASSWORD)
        .await
        .is_ok());
}

#[tokio::test]
async fn ensure_admin_is_idempotent() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let (credentials, _) = services(store);

    let first = credentials.ensure_admin("root@clinic.test", ADMIN_PASSWORD).await.unwrap();
    let second = credentials.ensure_admin("Root@Clinic.test", ADMIN_PASSWORD).await.unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
}
