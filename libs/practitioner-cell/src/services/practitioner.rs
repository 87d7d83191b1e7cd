use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use auth_cell::CredentialService;
use security_cell::RelationshipAuthorizer;
use shared_database::ClinicStore;
use shared_models::auth::{Principal, Role};
use shared_models::people::Practitioner;

use crate::models::{CreatePractitionerRequest, PractitionerError, UpdatePractitionerRequest};

pub struct PractitionerService {
    store: Arc<dyn ClinicStore>,
    credentials: CredentialService,
}

impl PractitionerService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self {
            credentials: CredentialService::new(store.clone()),
            store,
        }
    }

    /// Registers the login credential first, then the profile it points at.
    pub async fn create_practitioner(
        &self,
        principal: &Principal,
        request: CreatePractitionerRequest,
    ) -> Result<Practitioner, PractitionerError> {
        RelationshipAuthorizer::require_admin(principal)?;

        let display_name = required(&request.display_name, "Display name")?;
        let specialty = required(&request.specialty, "Specialty")?;

        let practitioner_id = Uuid::new_v4();
        let credential = self
            .credentials
            .register(Role::Practitioner, practitioner_id, &request.identifier, &request.password)
            .await?;

        let now = Utc::now();
        let practitioner = self
            .store
            .insert_practitioner(Practitioner {
                id: practitioner_id,
                display_name,
                specialty,
                years_of_experience: request.years_of_experience,
                credential_id: credential.id,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|e| {
                warn!("Practitioner credential {} stored without a profile: {}", credential.identifier, e);
                PractitionerError::from(e)
            })?;

        info!("Practitioner {} created by admin {}", practitioner.id, principal.id);
        Ok(practitioner)
    }

    pub async fn get_practitioner(&self, practitioner_id: Uuid) -> Result<Practitioner, PractitionerError> {
        self.store
            .get_practitioner(practitioner_id)
            .await?
            .ok_or(PractitionerError::NotFound)
    }

    pub async fn list_practitioners(&self) -> Result<Vec<Practitioner>, PractitionerError> {
        let mut practitioners = self.store.list_practitioners().await?;
        practitioners.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(practitioners)
    }

    /// Admins or the practitioner themself. Absent fields stay unchanged.
    pub async fn update_practitioner(
        &self,
        principal: &Principal,
        practitioner_id: Uuid,
        request: UpdatePractitionerRequest,
    ) -> Result<Practitioner, PractitionerError> {
        RelationshipAuthorizer::require_admin_or_self(principal, Role::Practitioner, practitioner_id)?;

        let mut practitioner = self.get_practitioner(practitioner_id).await?;

        if let Some(display_name) = request.display_name {
            practitioner.display_name = required(&display_name, "Display name")?;
        }
        if let Some(specialty) = request.specialty {
            practitioner.specialty = required(&specialty, "Specialty")?;
        }
        if let Some(years) = request.years_of_experience {
            practitioner.years_of_experience = years;
        }
        practitioner.updated_at = Utc::now();

        let updated = self
            .store
            .update_practitioner(practitioner)
            .await?
            .ok_or(PractitionerError::NotFound)?;

        debug!("Practitioner {} updated by {} {}", updated.id, principal.role, principal.id);
        Ok(updated)
    }

    /// Refused while any appointment references the practitioner.
    pub async fn delete_practitioner(&self, principal: &Principal, practitioner_id: Uuid) -> Result<(), PractitionerError> {
        RelationshipAuthorizer::require_admin(principal)?;

        if !self.store.delete_practitioner(practitioner_id).await? {
            return Err(PractitionerError::NotFound);
        }

        info!("Practitioner {} deleted by admin {}", practitioner_id, principal.id);
        Ok(())
    }
}

fn required(value: &str, field: &str) -> Result<String, PractitionerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PractitionerError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
