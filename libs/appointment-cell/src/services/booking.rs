use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use security_cell::{AccessError, RelationshipAuthorizer};
use shared_database::{AppState, ClinicStore};
use shared_models::auth::{Principal, Role};
use shared_models::scheduling::{Appointment, AppointmentFilter, BookingCommit, SlotStatus};
use slot_cell::{SlotLifecycle, SlotTransition};

use crate::models::{
    AppointmentListQuery, AvailabilityQuery, AvailabilityResponse, BookAppointmentRequest, BookingError,
};

/// Turns an AVAILABLE slot into an appointment. The only writer of the
/// `AVAILABLE -> BOOKED` transition.
pub struct BookingCoordinator {
    store: Arc<dyn ClinicStore>,
    authorizer: RelationshipAuthorizer,
    allow_unmanaged_slots: bool,
}

impl BookingCoordinator {
    pub fn new(store: Arc<dyn ClinicStore>, allow_unmanaged_slots: bool) -> Self {
        Self {
            authorizer: RelationshipAuthorizer::new(store.clone()),
            store,
            allow_unmanaged_slots,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.store.clone(), state.config.allow_unmanaged_slots)
    }

    pub async fn book(&self, principal: &Principal, request: BookAppointmentRequest) -> Result<Appointment, BookingError> {
        let time = request.time.trim();
        if time.is_empty() {
            return Err(BookingError::Validation("Appointment time is required".to_string()));
        }
        let patient_name = request.patient_name.trim();
        if patient_name.is_empty() {
            return Err(BookingError::Validation("Patient name is required".to_string()));
        }

        self.authorizer
            .authorize_patient_access(principal, request.patient_id)
            .await?;

        if self.store.get_practitioner(request.practitioner_id).await?.is_none() {
            return Err(BookingError::PractitionerNotFound);
        }
        if self.store.get_patient(request.patient_id).await?.is_none() {
            return Err(BookingError::PatientNotFound);
        }

        let slot_id = match self.store.find_slot(request.practitioner_id, request.date, time).await? {
            Some(slot) => {
                if SlotLifecycle::next_status(slot.status, SlotTransition::Book).is_err() {
                    debug!("Slot {} is {}, refusing booking", slot.id, slot.status);
                    return Err(BookingError::SlotUnavailable);
                }
                Some(slot.id)
            }
            None if self.allow_unmanaged_slots => {
                debug!(
                    "Booking unmanaged availability {} {} for practitioner {}",
                    request.date, time, request.practitioner_id
                );
                None
            }
            None => return Err(BookingError::SlotNotFound),
        };

        let appointment = Appointment {
            id: Uuid::new_v4(),
            practitioner_id: request.practitioner_id,
            patient_id: request.patient_id,
            slot_id,
            date: request.date,
            time: time.to_string(),
            patient_name: patient_name.to_string(),
            created_at: Utc::now(),
        };

        match self.store.commit_booking(slot_id, appointment).await? {
            BookingCommit::Booked(appointment) => {
                info!(
                    "Booked appointment {} with practitioner {} on {} at {}",
                    appointment.id, appointment.practitioner_id, appointment.date, appointment.time
                );
                Ok(appointment)
            }
            BookingCommit::Unavailable => {
                warn!(
                    "Lost booking race for practitioner {} on {} at {}",
                    request.practitioner_id, request.date, time
                );
                Err(BookingError::SlotUnavailable)
            }
        }
    }

    /// Bookable labels for one practitioner and day, ascending.
    pub async fn availability(&self, query: AvailabilityQuery) -> Result<AvailabilityResponse, BookingError> {
        let slots = self.store.list_slots(query.practitioner_id, Some(query.date)).await?;
        let booked: HashSet<String> = self
            .store
            .list_appointments(AppointmentFilter {
                practitioner_id: Some(query.practitioner_id),
                patient_id: None,
                date: Some(query.date),
            })
            .await?
            .into_iter()
            .map(|a| a.time)
            .collect();

        let available_slots: Vec<String> = slots
            .iter()
            .filter(|slot| slot.status == SlotStatus::Available && !booked.contains(&slot.time))
            .map(|slot| slot.time.clone())
            .collect();

        Ok(AvailabilityResponse {
            is_full: available_slots.is_empty() && !slots.is_empty(),
            available_slots,
        })
    }

    /// Admins see everything; practitioners and patients only their own.
    pub async fn list_appointments(
        &self,
        principal: &Principal,
        query: AppointmentListQuery,
    ) -> Result<Vec<Appointment>, BookingError> {
        let filter = match principal.role {
            Role::Admin => AppointmentFilter {
                practitioner_id: query.practitioner_id,
                patient_id: query.patient_id,
                date: query.date,
            },
            Role::Practitioner => {
                if query.practitioner_id.is_some_and(|id| id != principal.id) {
                    return Err(AccessError::Forbidden("Cannot list another practitioner's appointments".to_string()).into());
                }
                AppointmentFilter {
                    practitioner_id: Some(principal.id),
                    patient_id: query.patient_id,
                    date: query.date,
                }
            }
            Role::Patient => {
                if query.patient_id.is_some_and(|id| id != principal.id) {
                    return Err(AccessError::Forbidden("Cannot list another patient's appointments".to_string()).into());
                }
                AppointmentFilter {
                    practitioner_id: query.practitioner_id,
                    patient_id: Some(principal.id),
                    date: query.date,
                }
            }
        };

        let mut appointments = self.store.list_appointments(filter).await?;
        appointments.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        Ok(appointments)
    }
}
