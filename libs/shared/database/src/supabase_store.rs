use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::people::{ClinicalEntry, CredentialRecord, Patient, Practitioner};
use shared_models::scheduling::{
    Appointment, AppointmentFilter, BookingCommit, SlotStatus, TimeSlot,
};

use crate::store::{ClinicStore, StoreError, StoreResult};
use crate::supabase::{SupabaseClient, SupabaseError};

const SLOT_ORDER: &str = "order=date.asc,time.asc";

impl From<SupabaseError> for StoreError {
    fn from(error: SupabaseError) -> Self {
        match error {
            SupabaseError::Conflict(message) => StoreError::Conflict(message),
            SupabaseError::Http(e) if e.is_decode() => StoreError::Decode(e.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Row shape of the three credential tables; the role is implied by the table.
#[derive(Debug, Serialize, Deserialize)]
struct CredentialRow {
    id: Uuid,
    principal_id: Uuid,
    identifier: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_record(self, role: Role) -> CredentialRecord {
        CredentialRecord {
            id: self.id,
            role,
            principal_id: self.principal_id,
            identifier: self.identifier,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}

fn credential_table(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin_credentials",
        Role::Practitioner => "practitioner_credentials",
        Role::Patient => "patient_credentials",
    }
}

fn prefer(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static(value));
    headers
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `ClinicStore` over Supabase's PostgREST interface. Schema and the
/// `book_time_slot` / `append_clinical_entry` functions live in
/// `supabase/migrations`.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn with_client(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    async fn select<T: serde::de::DeserializeOwned>(&self, path: &str) -> StoreResult<Vec<T>> {
        Ok(self.supabase.request(Method::GET, path, None).await?)
    }

    async fn write<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Value,
    ) -> StoreResult<Vec<T>> {
        Ok(self
            .supabase
            .request_with_headers(method, path, Some(body), Some(prefer("return=representation")))
            .await?)
    }

    async fn first<T: serde::de::DeserializeOwned>(&self, path: &str) -> StoreResult<Option<T>> {
        Ok(self.select::<T>(path).await?.into_iter().next())
    }

    fn to_body<T: Serialize>(value: &T) -> StoreResult<Value> {
        serde_json::to_value(value).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ClinicStore for SupabaseStore {
    async fn insert_credential(&self, record: CredentialRecord) -> StoreResult<CredentialRecord> {
        let role = record.role;
        let row = CredentialRow {
            id: record.id,
            principal_id: record.principal_id,
            identifier: record.identifier,
            password_hash: record.password_hash,
            created_at: record.created_at,
        };
        let path = format!("/rest/v1/{}", credential_table(role));
        let inserted: Vec<CredentialRow> = self.write(Method::POST, &path, Self::to_body(&row)?).await?;

        inserted
            .into_iter()
            .next()
            .map(|row| row.into_record(role))
            .ok_or_else(|| StoreError::Backend("Credential insert returned no rows".to_string()))
    }

    async fn find_credential(&self, role: Role, identifier: &str) -> StoreResult<Option<CredentialRecord>> {
        let path = format!(
            "/rest/v1/{}?identifier=eq.{}&limit=1",
            credential_table(role),
            encode(identifier)
        );
        let row: Option<CredentialRow> = self.first(&path).await?;
        Ok(row.map(|row| row.into_record(role)))
    }

    async fn insert_practitioner(&self, practitioner: Practitioner) -> StoreResult<Practitioner> {
        let inserted: Vec<Practitioner> = self
            .write(Method::POST, "/rest/v1/practitioners", Self::to_body(&practitioner)?)
            .await?;
        inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("Practitioner insert returned no rows".to_string()))
    }

    async fn get_practitioner(&self, id: Uuid) -> StoreResult<Option<Practitioner>> {
        self.first(&format!("/rest/v1/practitioners?id=eq.{}", id)).await
    }

    async fn list_practitioners(&self) -> StoreResult<Vec<Practitioner>> {
        self.select("/rest/v1/practitioners?order=display_name.asc").await
    }

    async fn update_practitioner(&self, practitioner: Practitioner) -> StoreResult<Option<Practitioner>> {
        let path = format!("/rest/v1/practitioners?id=eq.{}", practitioner.id);
        let updated: Vec<Practitioner> = self
            .write(Method::PATCH, &path, Self::to_body(&practitioner)?)
            .await?;
        Ok(updated.into_iter().next())
    }

    async fn delete_practitioner(&self, id: Uuid) -> StoreResult<bool> {
        let path = format!("/rest/v1/practitioners?id=eq.{}", id);
        let deleted: Vec<Value> = match self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, Some(prefer("return=representation")))
            .await
        {
            Ok(rows) => rows,
            // Foreign-key violations from appointments surface as 409.
            Err(SupabaseError::Conflict(message)) => return Err(StoreError::Referenced(message)),
            Err(e) => return Err(e.into()),
        };

        if deleted.is_empty() {
            return Ok(false);
        }

        let credential_path = format!(
            "/rest/v1/{}?principal_id=eq.{}",
            credential_table(Role::Practitioner),
            id
        );
        let _: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &credential_path, None, Some(prefer("return=representation")))
            .await?;
        Ok(true)
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        let inserted: Vec<Patient> = self
            .write(Method::POST, "/rest/v1/patients", Self::to_body(&patient)?)
            .await?;
        inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("Patient insert returned no rows".to_string()))
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        self.first(&format!("/rest/v1/patients?id=eq.{}", id)).await
    }

    async fn update_patient(&self, patient: Patient) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient.id);
        let updated: Vec<Patient> = self.write(Method::PATCH, &path, Self::to_body(&patient)?).await?;
        Ok(updated.into_iter().next())
    }

    async fn append_clinical_entry(&self, patient_id: Uuid, entry: ClinicalEntry) -> StoreResult<Option<Patient>> {
        let entry_value = Self::to_body(&entry)?;
        let body = json!({
            "p_patient_id": patient_id,
            "p_kind": entry_value["kind"],
            "p_entry": entry_value["entry"],
        });
        let updated: Vec<Patient> = self
            .supabase
            .request(Method::POST, "/rest/v1/rpc/append_clinical_entry", Some(body))
            .await?;
        Ok(updated.into_iter().next())
    }

    async fn insert_slots_if_absent(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
        times: &[String],
    ) -> StoreResult<Vec<TimeSlot>> {
        let rows: Vec<TimeSlot> = times
            .iter()
            .map(|time| TimeSlot::new_pending(practitioner_id, date, time.clone()))
            .collect();

        let inserted: Vec<TimeSlot> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/time_slots?on_conflict=practitioner_id,date,time",
                Some(Self::to_body(&rows)?),
                Some(prefer("resolution=ignore-duplicates,return=representation")),
            )
            .await?;
        debug!("Inserted {} of {} requested slots", inserted.len(), times.len());

        let existing = self.list_slots(practitioner_id, Some(date)).await?;
        Ok(existing
            .into_iter()
            .filter(|slot| times.iter().any(|time| *time == slot.time))
            .collect())
    }

    async fn get_slot(&self, id: Uuid) -> StoreResult<Option<TimeSlot>> {
        self.first(&format!("/rest/v1/time_slots?id=eq.{}", id)).await
    }

    async fn find_slot(&self, practitioner_id: Uuid, date: NaiveDate, time: &str) -> StoreResult<Option<TimeSlot>> {
        let path = format!(
            "/rest/v1/time_slots?practitioner_id=eq.{}&date=eq.{}&time=eq.{}&limit=1",
            practitioner_id,
            date,
            encode(time)
        );
        self.first(&path).await
    }

    async fn list_slots(&self, practitioner_id: Uuid, date: Option<NaiveDate>) -> StoreResult<Vec<TimeSlot>> {
        let mut path = format!("/rest/v1/time_slots?practitioner_id=eq.{}", practitioner_id);
        if let Some(date) = date {
            path.push_str(&format!("&date=eq.{}", date));
        }
        path.push('&');
        path.push_str(SLOT_ORDER);
        self.select(&path).await
    }

    async fn transition_slot(&self, id: Uuid, expected: SlotStatus, next: SlotStatus) -> StoreResult<Option<TimeSlot>> {
        // The status filter makes this a conditional update: zero rows means
        // another writer moved the slot first.
        let path = format!("/rest/v1/time_slots?id=eq.{}&status=eq.{}", id, expected);
        let body = json!({
            "status": next,
            "updated_at": Utc::now(),
        });
        let updated: Vec<TimeSlot> = self.write(Method::PATCH, &path, body).await?;
        Ok(updated.into_iter().next())
    }

    async fn commit_booking(&self, slot_id: Option<Uuid>, appointment: Appointment) -> StoreResult<BookingCommit> {
        let body = json!({
            "p_slot_id": slot_id,
            "p_appointment": Self::to_body(&appointment)?,
        });

        match self
            .supabase
            .request::<Vec<Appointment>>(Method::POST, "/rest/v1/rpc/book_time_slot", Some(body))
            .await
        {
            Ok(rows) => Ok(rows
                .into_iter()
                .next()
                .map(BookingCommit::Booked)
                .unwrap_or(BookingCommit::Unavailable)),
            Err(SupabaseError::Conflict(message)) => {
                warn!("Booking rejected by unique constraint: {}", message);
                Ok(BookingCommit::Unavailable)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let mut path = String::from("/rest/v1/appointments?");
        if let Some(practitioner_id) = filter.practitioner_id {
            path.push_str(&format!("practitioner_id=eq.{}&", practitioner_id));
        }
        if let Some(patient_id) = filter.patient_id {
            path.push_str(&format!("patient_id=eq.{}&", patient_id));
        }
        if let Some(date) = filter.date {
            path.push_str(&format!("date=eq.{}&", date));
        }
        path.push_str(SLOT_ORDER);
        self.select(&path).await
    }

    async fn has_appointment_between(&self, practitioner_id: Uuid, patient_id: Uuid) -> StoreResult<bool> {
        let path = format!(
            "/rest/v1/appointments?practitioner_id=eq.{}&patient_id=eq.{}&select=id&limit=1",
            practitioner_id, patient_id
        );
        let rows: Vec<Value> = self.select(&path).await?;
        Ok(!rows.is_empty())
    }
}
