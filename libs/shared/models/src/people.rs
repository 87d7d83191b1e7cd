use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// Identifiers are compared trimmed and case-insensitively.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Practitioner {
    pub id: Uuid,
    pub display_name: String,
    pub specialty: String,
    pub years_of_experience: u32,
    pub credential_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnosis {
    pub id: Uuid,
    pub description: String,
    pub recorded_by: Uuid,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub id: Uuid,
    pub medication: String,
    pub dosage: String,
    pub instructions: Option<String>,
    pub prescribed_by: Uuid,
    pub prescribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReport {
    pub id: Uuid,
    pub title: String,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub display_name: String,
    pub credential_id: Uuid,
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    #[serde(default)]
    pub lab_reports: Vec<LabReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(display_name: impl Into<String>, credential_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            credential_id,
            diagnoses: Vec::new(),
            prescriptions: Vec::new(),
            lab_reports: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A clinical write appended to a patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "entry", rename_all = "snake_case")]
pub enum ClinicalEntry {
    Diagnosis(Diagnosis),
    Prescription(Prescription),
}

/// A login credential. `identifier` is unique within its role's namespace only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub role: Role,
    pub principal_id: Uuid,
    pub identifier: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_trimmed_and_lower_cased() {
        assert_eq!(normalize_identifier("  Dr.House@Clinic.TEST "), "dr.house@clinic.test");
    }

    #[test]
    fn clinical_entries_are_tagged_by_kind() {
        let entry = ClinicalEntry::Diagnosis(Diagnosis {
            id: Uuid::new_v4(),
            description: "Seasonal allergic rhinitis".to_string(),
            recorded_by: Uuid::new_v4(),
            recorded_at: Utc::now(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "diagnosis");
        assert_eq!(value["entry"]["description"], "Seasonal allergic rhinitis");
    }
}
