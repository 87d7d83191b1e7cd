// =====================================================================================
// RELATIONSHIP AUTHORIZER
// =====================================================================================
//
// Access to a patient record:
//   admin        -> always
//   patient      -> only its own record
//   practitioner -> only with at least one appointment with that patient
//
// Denials carry one uniform message so a caller cannot tell "no such patient"
// apart from "not yours".
//
// =====================================================================================

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::ClinicStore;
use shared_models::auth::{Principal, Role};

use crate::models::AccessError;

pub const PATIENT_ACCESS_DENIED: &str = "Not authorized to access this patient record";

pub struct RelationshipAuthorizer {
    store: Arc<dyn ClinicStore>,
}

impl RelationshipAuthorizer {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Pure decision. Store failures are errors, never a silent `false`.
    pub async fn can_access_patient(&self, principal: &Principal, patient_id: Uuid) -> Result<bool, AccessError> {
        match principal.role {
            Role::Admin => Ok(true),
            Role::Patient => Ok(principal.id == patient_id),
            Role::Practitioner => {
                let related = self
                    .store
                    .has_appointment_between(principal.id, patient_id)
                    .await?;
                debug!(
                    "Practitioner {} relationship with patient {}: {}",
                    principal.id, patient_id, related
                );
                Ok(related)
            }
        }
    }

    pub async fn authorize_patient_access(&self, principal: &Principal, patient_id: Uuid) -> Result<(), AccessError> {
        if self.can_access_patient(principal, patient_id).await? {
            Ok(())
        } else {
            warn!(
                "Denied {} {} access to patient {}",
                principal.role, principal.id, patient_id
            );
            Err(AccessError::Forbidden(PATIENT_ACCESS_DENIED.to_string()))
        }
    }

    pub fn require_admin(principal: &Principal) -> Result<(), AccessError> {
        match principal.role {
            Role::Admin => Ok(()),
            _ => Err(AccessError::Forbidden("Admin role required".to_string())),
        }
    }

    /// Returns the practitioner id carried by the principal.
    pub fn require_practitioner(principal: &Principal) -> Result<Uuid, AccessError> {
        match principal.role {
            Role::Practitioner => Ok(principal.id),
            _ => Err(AccessError::Forbidden("Practitioner role required".to_string())),
        }
    }

    /// Admin, or the principal whose own profile `subject_id` is. The role has
    /// to match the subject kind, so ids never match across namespaces.
    pub fn require_admin_or_self(principal: &Principal, subject_role: Role, subject_id: Uuid) -> Result<(), AccessError> {
        if principal.role == Role::Admin || (principal.role == subject_role && principal.id == subject_id) {
            Ok(())
        } else {
            Err(AccessError::Forbidden("Not authorized to access this profile".to_string()))
        }
    }

    pub fn require_clinical_author(principal: &Principal) -> Result<(), AccessError> {
        match principal.role {
            Role::Admin | Role::Practitioner => Ok(()),
            Role::Patient => Err(AccessError::Forbidden(
                "Only practitioners can record clinical entries".to_string(),
            )),
        }
    }
}
