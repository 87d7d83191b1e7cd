use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use auth_cell::CredentialService;
use security_cell::RelationshipAuthorizer;
use shared_database::ClinicStore;
use shared_models::auth::{Principal, Role};
use shared_models::people::{ClinicalEntry, Diagnosis, Patient, Prescription};
use shared_utils::jwt::TokenIssuer;

use crate::models::{
    AddDiagnosisRequest, AddPrescriptionRequest, CreatePatientRequest, PatientError, SignupResponse,
    UpdatePatientRequest,
};

pub struct PatientService {
    store: Arc<dyn ClinicStore>,
    credentials: CredentialService,
    authorizer: RelationshipAuthorizer,
}

impl PatientService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self {
            credentials: CredentialService::new(store.clone()),
            authorizer: RelationshipAuthorizer::new(store.clone()),
            store,
        }
    }

    /// Public self-registration. The new patient is logged in straight away.
    pub async fn signup(&self, request: CreatePatientRequest, issuer: &TokenIssuer) -> Result<SignupResponse, PatientError> {
        let patient = self.register(request).await?;
        let issued = issuer
            .issue(patient.id, Role::Patient)
            .map_err(auth_cell::AuthError::from)?;

        Ok(SignupResponse {
            patient,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    pub async fn create_patient(&self, principal: &Principal, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        RelationshipAuthorizer::require_admin(principal)?;
        self.register(request).await
    }

    /// Authorization runs before the lookup so the answer for an unrelated
    /// caller is the same whether or not the patient exists.
    pub async fn get_patient(&self, principal: &Principal, patient_id: Uuid) -> Result<Patient, PatientError> {
        self.authorizer.authorize_patient_access(principal, patient_id).await?;

        self.store
            .get_patient(patient_id)
            .await?
            .ok_or(PatientError::NotFound)
    }

    pub async fn update_patient(
        &self,
        principal: &Principal,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        RelationshipAuthorizer::require_admin_or_self(principal, Role::Patient, patient_id)?;

        let mut patient = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or(PatientError::NotFound)?;
        patient.display_name = required(&request.display_name, "Display name")?;
        patient.updated_at = Utc::now();

        self.store
            .update_patient(patient)
            .await?
            .ok_or(PatientError::NotFound)
    }

    pub async fn add_prescription(
        &self,
        principal: &Principal,
        patient_id: Uuid,
        request: AddPrescriptionRequest,
    ) -> Result<Patient, PatientError> {
        self.authorize_clinical_write(principal, patient_id).await?;

        let prescription = Prescription {
            id: Uuid::new_v4(),
            medication: required(&request.medication, "Medication")?,
            dosage: required(&request.dosage, "Dosage")?,
            instructions: request
                .instructions
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
            prescribed_by: principal.id,
            prescribed_at: Utc::now(),
        };

        let patient = self
            .store
            .append_clinical_entry(patient_id, ClinicalEntry::Prescription(prescription))
            .await?
            .ok_or(PatientError::NotFound)?;

        info!("Prescription added to patient {} by {} {}", patient_id, principal.role, principal.id);
        Ok(patient)
    }

    pub async fn add_diagnosis(
        &self,
        principal: &Principal,
        patient_id: Uuid,
        request: AddDiagnosisRequest,
    ) -> Result<Patient, PatientError> {
        RelationshipAuthorizer::require_admin(principal)?;

        let diagnosis = Diagnosis {
            id: Uuid::new_v4(),
            description: required(&request.description, "Description")?,
            recorded_by: principal.id,
            recorded_at: Utc::now(),
        };

        let patient = self
            .store
            .append_clinical_entry(patient_id, ClinicalEntry::Diagnosis(diagnosis))
            .await?
            .ok_or(PatientError::NotFound)?;

        info!("Diagnosis added to patient {} by {} {}", patient_id, principal.role, principal.id);
        Ok(patient)
    }

    async fn authorize_clinical_write(&self, principal: &Principal, patient_id: Uuid) -> Result<(), PatientError> {
        RelationshipAuthorizer::require_clinical_author(principal)?;
        self.authorizer.authorize_patient_access(principal, patient_id).await?;
        Ok(())
    }

    /// Credential first, then the profile row it belongs to.
    async fn register(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let display_name = required(&request.display_name, "Display name")?;

        let patient_id = Uuid::new_v4();
        let credential = self
            .credentials
            .register(Role::Patient, patient_id, &request.identifier, &request.password)
            .await?;

        let mut patient = Patient::new(display_name, credential.id);
        patient.id = patient_id;
        let patient = self.store.insert_patient(patient).await.map_err(|e| {
            warn!("Patient credential {} stored without a profile: {}", credential.identifier, e);
            PatientError::from(e)
        })?;

        debug!("Patient {} registered as {}", patient.id, credential.identifier);
        Ok(patient)
    }
}

fn required(value: &str, field: &str) -> Result<String, PatientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PatientError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
