use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::Role;
use shared_models::people::{ClinicalEntry, CredentialRecord, Patient, Practitioner};
use shared_models::scheduling::{
    Appointment, AppointmentFilter, BookingCommit, SlotStatus, TimeSlot,
};

use crate::store::{ClinicStore, StoreError, StoreResult};

type SlotKey = (Uuid, NaiveDate, String);

#[derive(Default)]
struct Tables {
    credentials: HashMap<Role, HashMap<String, CredentialRecord>>,
    practitioners: HashMap<Uuid, Practitioner>,
    patients: HashMap<Uuid, Patient>,
    slots: HashMap<Uuid, TimeSlot>,
    slot_index: HashMap<SlotKey, Uuid>,
    appointments: Vec<Appointment>,
}

impl Tables {
    fn triple_occupied(&self, practitioner_id: Uuid, date: NaiveDate, time: &str) -> bool {
        self.appointments
            .iter()
            .any(|appointment| appointment.occupies(practitioner_id, date, time))
    }
}

/// Process-local store. Every mutation runs under a single write lock, which
/// serializes concurrent bookings of the same slot.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slot_key(practitioner_id: Uuid, date: NaiveDate, time: &str) -> SlotKey {
    (practitioner_id, date, time.to_string())
}

fn sort_slots(slots: &mut [TimeSlot]) {
    slots.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}

#[async_trait]
impl ClinicStore for MemoryStore {
    async fn insert_credential(&self, record: CredentialRecord) -> StoreResult<CredentialRecord> {
        let mut tables = self.tables.write().await;
        let namespace = tables.credentials.entry(record.role).or_default();
        if namespace.contains_key(&record.identifier) {
            return Err(StoreError::Conflict(format!(
                "{} identifier '{}' already registered",
                record.role, record.identifier
            )));
        }
        namespace.insert(record.identifier.clone(), record.clone());
        Ok(record)
    }

    async fn find_credential(&self, role: Role, identifier: &str) -> StoreResult<Option<CredentialRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .credentials
            .get(&role)
            .and_then(|namespace| namespace.get(identifier))
            .cloned())
    }

    async fn insert_practitioner(&self, practitioner: Practitioner) -> StoreResult<Practitioner> {
        let mut tables = self.tables.write().await;
        if tables.practitioners.contains_key(&practitioner.id) {
            return Err(StoreError::Conflict(format!("practitioner {}", practitioner.id)));
        }
        tables.practitioners.insert(practitioner.id, practitioner.clone());
        Ok(practitioner)
    }

    async fn get_practitioner(&self, id: Uuid) -> StoreResult<Option<Practitioner>> {
        Ok(self.tables.read().await.practitioners.get(&id).cloned())
    }

    async fn list_practitioners(&self) -> StoreResult<Vec<Practitioner>> {
        let tables = self.tables.read().await;
        let mut practitioners: Vec<Practitioner> = tables.practitioners.values().cloned().collect();
        practitioners.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(practitioners)
    }

    async fn update_practitioner(&self, practitioner: Practitioner) -> StoreResult<Option<Practitioner>> {
        let mut tables = self.tables.write().await;
        match tables.practitioners.get_mut(&practitioner.id) {
            Some(existing) => {
                *existing = practitioner.clone();
                Ok(Some(practitioner))
            }
            None => Ok(None),
        }
    }

    async fn delete_practitioner(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.practitioners.contains_key(&id) {
            return Ok(false);
        }
        if tables.appointments.iter().any(|a| a.practitioner_id == id) {
            return Err(StoreError::Referenced(format!(
                "practitioner {} has appointments",
                id
            )));
        }

        tables.practitioners.remove(&id);
        tables.slots.retain(|_, slot| slot.practitioner_id != id);
        tables.slot_index.retain(|(practitioner_id, _, _), _| *practitioner_id != id);
        if let Some(namespace) = tables.credentials.get_mut(&Role::Practitioner) {
            namespace.retain(|_, record| record.principal_id != id);
        }
        Ok(true)
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;
        if tables.patients.contains_key(&patient.id) {
            return Err(StoreError::Conflict(format!("patient {}", patient.id)));
        }
        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn update_patient(&self, patient: Patient) -> StoreResult<Option<Patient>> {
        let mut tables = self.tables.write().await;
        match tables.patients.get_mut(&patient.id) {
            Some(existing) => {
                *existing = patient.clone();
                Ok(Some(patient))
            }
            None => Ok(None),
        }
    }

    async fn append_clinical_entry(&self, patient_id: Uuid, entry: ClinicalEntry) -> StoreResult<Option<Patient>> {
        let mut tables = self.tables.write().await;
        let Some(patient) = tables.patients.get_mut(&patient_id) else {
            return Ok(None);
        };
        match entry {
            ClinicalEntry::Diagnosis(diagnosis) => patient.diagnoses.push(diagnosis),
            ClinicalEntry::Prescription(prescription) => patient.prescriptions.push(prescription),
        }
        patient.updated_at = Utc::now();
        Ok(Some(patient.clone()))
    }

    async fn insert_slots_if_absent(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
        times: &[String],
    ) -> StoreResult<Vec<TimeSlot>> {
        let mut tables = self.tables.write().await;
        let mut result = Vec::with_capacity(times.len());

        for time in times {
            let key = slot_key(practitioner_id, date, time);
            if let Some(existing_id) = tables.slot_index.get(&key).copied() {
                if let Some(existing) = tables.slots.get(&existing_id) {
                    if !result.iter().any(|s: &TimeSlot| s.id == existing.id) {
                        result.push(existing.clone());
                    }
                }
                continue;
            }

            let slot = TimeSlot::new_pending(practitioner_id, date, time.clone());
            debug!("Inserting slot {} for practitioner {} at {} {}", slot.id, practitioner_id, date, time);
            tables.slot_index.insert(key, slot.id);
            tables.slots.insert(slot.id, slot.clone());
            result.push(slot);
        }

        sort_slots(&mut result);
        Ok(result)
    }

    async fn get_slot(&self, id: Uuid) -> StoreResult<Option<TimeSlot>> {
        Ok(self.tables.read().await.slots.get(&id).cloned())
    }

    async fn find_slot(&self, practitioner_id: Uuid, date: NaiveDate, time: &str) -> StoreResult<Option<TimeSlot>> {
        let tables = self.tables.read().await;
        Ok(tables
            .slot_index
            .get(&slot_key(practitioner_id, date, time))
            .and_then(|id| tables.slots.get(id))
            .cloned())
    }

    async fn list_slots(&self, practitioner_id: Uuid, date: Option<NaiveDate>) -> StoreResult<Vec<TimeSlot>> {
        let tables = self.tables.read().await;
        let mut slots: Vec<TimeSlot> = tables
            .slots
            .values()
            .filter(|slot| slot.practitioner_id == practitioner_id)
            .filter(|slot| date.map_or(true, |d| slot.date == d))
            .cloned()
            .collect();
        sort_slots(&mut slots);
        Ok(slots)
    }

    async fn transition_slot(&self, id: Uuid, expected: SlotStatus, next: SlotStatus) -> StoreResult<Option<TimeSlot>> {
        let mut tables = self.tables.write().await;
        match tables.slots.get_mut(&id) {
            Some(slot) if slot.status == expected => {
                slot.status = next;
                slot.updated_at = Utc::now();
                Ok(Some(slot.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn commit_booking(&self, slot_id: Option<Uuid>, appointment: Appointment) -> StoreResult<BookingCommit> {
        let mut tables = self.tables.write().await;

        if tables.triple_occupied(appointment.practitioner_id, appointment.date, &appointment.time) {
            return Ok(BookingCommit::Unavailable);
        }

        match slot_id {
            Some(slot_id) => {
                let Some(slot) = tables.slots.get_mut(&slot_id) else {
                    return Ok(BookingCommit::Unavailable);
                };
                if slot.status != SlotStatus::Available {
                    return Ok(BookingCommit::Unavailable);
                }
                slot.status = SlotStatus::Booked;
                slot.updated_at = Utc::now();
            }
            None => {
                let key = slot_key(appointment.practitioner_id, appointment.date, &appointment.time);
                if tables.slot_index.contains_key(&key) {
                    return Ok(BookingCommit::Unavailable);
                }
            }
        }

        tables.appointments.push(appointment.clone());
        Ok(BookingCommit::Booked(appointment))
    }

    async fn list_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .iter()
            .filter(|appointment| filter.accepts(appointment))
            .cloned()
            .collect();
        appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
        Ok(appointments)
    }

    async fn has_appointment_between(&self, practitioner_id: Uuid, patient_id: Uuid) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .iter()
            .any(|a| a.practitioner_id == practitioner_id && a.patient_id == patient_id))
    }
}
