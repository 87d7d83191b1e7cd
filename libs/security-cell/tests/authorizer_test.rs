use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use security_cell::services::authorizer::PATIENT_ACCESS_DENIED;
use security_cell::{AccessError, RelationshipAuthorizer};
use shared_database::{ClinicStore, MemoryStore};
use shared_models::auth::Principal;
use shared_models::scheduling::Appointment;
use shared_utils::test_utils::TestFixtures;

async fn book_unmanaged(store: &dyn ClinicStore, practitioner_id: Uuid, patient_id: Uuid) {
    let appointment = Appointment {
        id: Uuid::new_v4(),
        practitioner_id,
        patient_id,
        slot_id: None,
        date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        time: "09:00".to_string(),
        patient_name: "Ada Lovelace".to_string(),
        created_at: Utc::now(),
    };
    store.commit_booking(None, appointment).await.unwrap();
}

#[tokio::test]
async fn practitioner_gains_access_only_through_an_appointment() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let practitioner = TestFixtures::practitioner(store.as_ref(), "Dr. Quinn").await.unwrap();
    let patient = TestFixtures::patient(store.as_ref(), "Ada Lovelace").await.unwrap();
    let authorizer = RelationshipAuthorizer::new(store.clone());
    let principal = Principal::practitioner(practitioner.id);

    assert!(!authorizer.can_access_patient(&principal, patient.id).await.unwrap());

    book_unmanaged(store.as_ref(), practitioner.id, patient.id).await;

    assert!(authorizer.can_access_patient(&principal, patient.id).await.unwrap());
}

#[tokio::test]
async fn relationship_is_per_practitioner() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let treating = TestFixtures::practitioner(store.as_ref(), "Dr. Quinn").await.unwrap();
    let other = TestFixtures::practitioner(store.as_ref(), "Dr. Grey").await.unwrap();
    let patient = TestFixtures::patient(store.as_ref(), "Ada Lovelace").await.unwrap();
    book_unmanaged(store.as_ref(), treating.id, patient.id).await;

    let authorizer = RelationshipAuthorizer::new(store);

    assert!(!authorizer
        .can_access_patient(&Principal::practitioner(other.id), patient.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn admin_always_and_patient_only_self() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let patient = TestFixtures::patient(store.as_ref(), "Ada Lovelace").await.unwrap();
    let someone_else = TestFixtures::patient(store.as_ref(), "Alan Turing").await.unwrap();
    let authorizer = RelationshipAuthorizer::new(store);

    assert!(authorizer
        .can_access_patient(&Principal::admin(Uuid::new_v4()), patient.id)
        .await
        .unwrap());
    assert!(authorizer
        .can_access_patient(&Principal::patient(patient.id), patient.id)
        .await
        .unwrap());
    assert!(!authorizer
        .can_access_patient(&Principal::patient(someone_else.id), patient.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn denial_message_does_not_reveal_whether_the_patient_exists() {
    let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
    let practitioner = TestFixtures::practitioner(store.as_ref(), "Dr. Quinn").await.unwrap();
    let existing = TestFixtures::patient(store.as_ref(), "Ada Lovelace").await.unwrap();
    let authorizer = RelationshipAuthorizer::new(store);
    let principal = Principal::practitioner(practitioner.id);

    let for_existing = authorizer.authorize_patient_access(&principal, existing.id).await;
    let for_missing = authorizer.authorize_patient_access(&principal, Uuid::new_v4()).await;

    assert_matches!(for_existing, Err(AccessError::Forbidden(ref m)) if m == PATIENT_ACCESS_DENIED);
    assert_matches!(for_missing, Err(AccessError::Forbidden(ref m)) if m == PATIENT_ACCESS_DENIED);
}
