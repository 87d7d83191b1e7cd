use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use security_cell::PasswordSecurityService;
use shared_database::ClinicStore;
use shared_models::auth::Role;
use shared_models::people::{normalize_identifier, CredentialRecord};

use crate::models::AuthError;

pub struct CredentialService {
    store: Arc<dyn ClinicStore>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Stores a hashed credential in `role`'s namespace. The profile row for
    /// `principal_id` is created by the caller afterwards.
    pub async fn register(
        &self,
        role: Role,
        principal_id: Uuid,
        identifier: &str,
        password: &str,
    ) -> Result<CredentialRecord, AuthError> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return Err(AuthError::Validation("Identifier is required".to_string()));
        }

        let strength = PasswordSecurityService::validate_password_strength(password);
        if !strength.is_acceptable() {
            debug!("Rejected weak password for new {} credential", role);
            return Err(AuthError::WeakPassword(strength.issues));
        }

        let password_hash = PasswordSecurityService::hash_password(password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let record = CredentialRecord {
            id: Uuid::new_v4(),
            role,
            principal_id,
            identifier,
            password_hash,
            created_at: Utc::now(),
        };

        let stored = self.store.insert_credential(record).await.map_err(|e| {
            warn!("Failed to store {} credential: {}", role, e);
            AuthError::from(e)
        })?;

        info!("Registered {} credential {}", role, stored.identifier);
        Ok(stored)
    }

    /// Creates the admin credential unless one already exists for `identifier`.
    pub async fn ensure_admin(&self, identifier: &str, password: &str) -> Result<Option<CredentialRecord>, AuthError> {
        let normalized = normalize_identifier(identifier);
        if self.store.find_credential(Role::Admin, &normalized).await?.is_some() {
            debug!("Admin credential {} already present", normalized);
            return Ok(None);
        }

        self.register(Role::Admin, Uuid::new_v4(), &normalized, password)
            .await
            .map(Some)
    }
}
