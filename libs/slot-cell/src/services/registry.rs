use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use security_cell::RelationshipAuthorizer;
use shared_database::ClinicStore;
use shared_models::auth::{Principal, Role};
use shared_models::scheduling::{SlotStatus, TimeSlot};

use crate::models::{CreateSlotsRequest, SlotError, SlotQuery, SlotTransition};
use crate::services::lifecycle::SlotLifecycle;

/// Re-reads allowed when a compare-and-set loses to a concurrent writer.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

pub struct SlotRegistryService {
    store: Arc<dyn ClinicStore>,
}

impl SlotRegistryService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Creates PENDING slots for every requested time that has none yet.
    /// Existing slots are returned as they are, so repeating a request is
    /// harmless.
    pub async fn create(&self, principal: &Principal, request: CreateSlotsRequest) -> Result<Vec<TimeSlot>, SlotError> {
        RelationshipAuthorizer::require_admin(principal)?;

        if request.times.is_empty() {
            return Err(SlotError::Validation("At least one time is required".to_string()));
        }

        let mut times = BTreeSet::new();
        for raw in &request.times {
            let time = raw.trim();
            if time.is_empty() {
                return Err(SlotError::Validation("Slot times must not be empty".to_string()));
            }
            times.insert(time.to_string());
        }

        if self.store.get_practitioner(request.practitioner_id).await?.is_none() {
            return Err(SlotError::PractitionerNotFound);
        }

        let times: Vec<String> = times.into_iter().collect();
        let slots = self
            .store
            .insert_slots_if_absent(request.practitioner_id, request.date, &times)
            .await?;

        info!(
            "Slots ensured for practitioner {} on {}: {}",
            request.practitioner_id,
            request.date,
            times.join(", ")
        );
        Ok(slots)
    }

    /// Admin, or the practitioner who owns the slot.
    pub async fn approve(&self, principal: &Principal, slot_id: Uuid) -> Result<TimeSlot, SlotError> {
        let practitioner_id = match principal.role {
            Role::Admin => None,
            _ => Some(RelationshipAuthorizer::require_practitioner(principal)?),
        };

        let slot = self.load(slot_id).await?;
        if let Some(practitioner_id) = practitioner_id {
            if slot.practitioner_id != practitioner_id {
                warn!("Practitioner {} tried to approve slot {} of another practitioner", practitioner_id, slot_id);
                return Err(SlotError::NotOwner);
            }
        }

        self.apply(slot, SlotTransition::Approve).await
    }

    /// Admin entry point for freezing (`FROZEN`) and unfreezing (`PENDING`).
    pub async fn set_status(&self, principal: &Principal, slot_id: Uuid, target: SlotStatus) -> Result<TimeSlot, SlotError> {
        RelationshipAuthorizer::require_admin(principal)?;

        let transition = match target {
            SlotStatus::Frozen => SlotTransition::Freeze,
            SlotStatus::Pending => SlotTransition::Unfreeze,
            other => {
                return Err(SlotError::Validation(format!(
                    "Status can only be set to FROZEN or PENDING, not {}",
                    other
                )))
            }
        };

        let slot = self.load(slot_id).await?;
        self.apply(slot, transition).await
    }

    pub async fn freeze(&self, principal: &Principal, slot_id: Uuid) -> Result<TimeSlot, SlotError> {
        self.set_status(principal, slot_id, SlotStatus::Frozen).await
    }

    pub async fn unfreeze(&self, principal: &Principal, slot_id: Uuid) -> Result<TimeSlot, SlotError> {
        self.set_status(principal, slot_id, SlotStatus::Pending).await
    }

    pub async fn list(&self, principal: &Principal, query: SlotQuery) -> Result<Vec<TimeSlot>, SlotError> {
        debug!(
            "{} {} listing slots of practitioner {}",
            principal.role, principal.id, query.practitioner_id
        );
        Ok(self.store.list_slots(query.practitioner_id, query.date).await?)
    }

    async fn load(&self, slot_id: Uuid) -> Result<TimeSlot, SlotError> {
        self.store.get_slot(slot_id).await?.ok_or(SlotError::NotFound)
    }

    /// Compare-and-set against the status the transition was evaluated on.
    /// A lost race re-reads the slot and evaluates the transition again.
    async fn apply(&self, mut slot: TimeSlot, transition: SlotTransition) -> Result<TimeSlot, SlotError> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let next = SlotLifecycle::next_status(slot.status, transition)?;

            if let Some(updated) = self.store.transition_slot(slot.id, slot.status, next).await? {
                info!("Slot {} moved {} -> {}", updated.id, slot.status, updated.status);
                return Ok(updated);
            }

            debug!("Slot {} changed underneath {} (attempt {})", slot.id, transition, attempt);
            slot = self.load(slot.id).await?;
        }

        warn!("Giving up on {} for slot {} after {} attempts", transition, slot.id, MAX_TRANSITION_ATTEMPTS);
        Err(SlotError::Contended)
    }
}
