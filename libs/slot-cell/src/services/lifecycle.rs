use tracing::debug;

use shared_models::scheduling::SlotStatus;

use crate::models::{SlotError, SlotTransition};

/// The slot state machine. Every status change in the workspace goes through
/// `next_status`; BOOKED is terminal.
pub struct SlotLifecycle;

impl SlotLifecycle {
    pub fn next_status(current: SlotStatus, transition: SlotTransition) -> Result<SlotStatus, SlotError> {
        let next = match (current, transition) {
            (SlotStatus::Pending, SlotTransition::Approve) => SlotStatus::Available,
            (SlotStatus::Pending, SlotTransition::Freeze) => SlotStatus::Frozen,
            (SlotStatus::Available, SlotTransition::Freeze) => SlotStatus::Frozen,
            (SlotStatus::Available, SlotTransition::Book) => SlotStatus::Booked,
            (SlotStatus::Frozen, SlotTransition::Unfreeze) => SlotStatus::Pending,
            (current, transition) => {
                debug!("Rejected slot transition {} from {}", transition, current);
                return Err(SlotError::InvalidState { current, transition });
            }
        };
        Ok(next)
    }

    pub fn allowed_transitions(current: SlotStatus) -> Vec<SlotTransition> {
        [
            SlotTransition::Approve,
            SlotTransition::Freeze,
            SlotTransition::Unfreeze,
            SlotTransition::Book,
        ]
        .into_iter()
        .filter(|transition| Self::next_status(current, *transition).is_ok())
        .collect()
    }
}
