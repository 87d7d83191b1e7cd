use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use shared_models::auth::Role;
use shared_models::people::{ClinicalEntry, CredentialRecord, Patient, Practitioner};
use shared_models::scheduling::{
    Appointment, AppointmentFilter, BookingCommit, SlotStatus, TimeSlot,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate record: {0}")]
    Conflict(String),

    #[error("Record is still referenced: {0}")]
    Referenced(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Failed to decode stored record: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted state of the portal core.
///
/// Implementations must honour two storage-level guarantees:
/// at most one `TimeSlot` and at most one `Appointment` per
/// `(practitioner, date, time)`, and `commit_booking` applying the
/// `AVAILABLE -> BOOKED` change and the appointment insert as one unit.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    /// Fails with `Conflict` when the identifier already exists for that role.
    async fn insert_credential(&self, record: CredentialRecord) -> StoreResult<CredentialRecord>;
    async fn find_credential(&self, role: Role, identifier: &str) -> StoreResult<Option<CredentialRecord>>;

    async fn insert_practitioner(&self, practitioner: Practitioner) -> StoreResult<Practitioner>;
    async fn get_practitioner(&self, id: Uuid) -> StoreResult<Option<Practitioner>>;
    async fn list_practitioners(&self) -> StoreResult<Vec<Practitioner>>;
    async fn update_practitioner(&self, practitioner: Practitioner) -> StoreResult<Option<Practitioner>>;
    /// Fails with `Referenced` while any appointment points at the practitioner.
    /// Removes the practitioner's slots and credential along with it.
    async fn delete_practitioner(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient>;
    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>>;
    async fn update_patient(&self, patient: Patient) -> StoreResult<Option<Patient>>;
    async fn append_clinical_entry(&self, patient_id: Uuid, entry: ClinicalEntry) -> StoreResult<Option<Patient>>;

    /// Inserts a PENDING slot for every time without one and returns the
    /// slots for all requested times, ordered by time.
    async fn insert_slots_if_absent(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
        times: &[String],
    ) -> StoreResult<Vec<TimeSlot>>;
    async fn get_slot(&self, id: Uuid) -> StoreResult<Option<TimeSlot>>;
    async fn find_slot(&self, practitioner_id: Uuid, date: NaiveDate, time: &str) -> StoreResult<Option<TimeSlot>>;
    /// Ordered by `(date, time)` ascending.
    async fn list_slots(&self, practitioner_id: Uuid, date: Option<NaiveDate>) -> StoreResult<Vec<TimeSlot>>;
    /// Compare-and-set on the status column. `None` when the slot is missing
    /// or its status is no longer `expected`.
    async fn transition_slot(&self, id: Uuid, expected: SlotStatus, next: SlotStatus) -> StoreResult<Option<TimeSlot>>;

    /// With `Some(slot_id)`: `AVAILABLE -> BOOKED` plus the appointment insert.
    /// With `None`: the appointment insert alone, refused if the triple is
    /// already managed or occupied.
    async fn commit_booking(&self, slot_id: Option<Uuid>, appointment: Appointment) -> StoreResult<BookingCommit>;
    async fn list_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>>;
    async fn has_appointment_between(&self, practitioner_id: Uuid, patient_id: Uuid) -> StoreResult<bool>;
}
