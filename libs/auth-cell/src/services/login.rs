use std::sync::Arc;

use tracing::{debug, info, warn};

use security_cell::PasswordSecurityService;
use shared_database::ClinicStore;
use shared_models::auth::{LoginRequest, LoginResponse, PrincipalSummary, Role};
use shared_models::people::{normalize_identifier, CredentialRecord};
use shared_utils::jwt::TokenIssuer;

use crate::models::AuthError;

pub struct LoginService {
    store: Arc<dyn ClinicStore>,
    issuer: TokenIssuer,
}

impl LoginService {
    pub fn new(store: Arc<dyn ClinicStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    /// Namespaces are tried in `Role::LOGIN_PRIORITY` order and the first
    /// credential whose password verifies wins. An identifier registered
    /// under several roles therefore logs in as the highest of them for
    /// which the password matches.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let identifier = normalize_identifier(&request.identifier);
        if identifier.is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation("Identifier and password are required".to_string()));
        }

        let credential = match self.find_verified(&identifier, &request.password).await? {
            Some(credential) => credential,
            None => {
                warn!("Failed login for {}", identifier);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let issued = self.issuer.issue(credential.principal_id, credential.role)?;
        let display_name = self.display_name(&credential).await?;

        info!("{} {} logged in", credential.role, credential.principal_id);

        Ok(LoginResponse {
            token: issued.token,
            role: credential.role,
            expires_at: issued.expires_at,
            principal: PrincipalSummary {
                id: credential.principal_id,
                role: credential.role,
                display_name,
            },
        })
    }

    async fn find_verified(&self, identifier: &str, password: &str) -> Result<Option<CredentialRecord>, AuthError> {
        for role in Role::LOGIN_PRIORITY {
            let Some(record) = self.store.find_credential(role, identifier).await? else {
                continue;
            };

            match PasswordSecurityService::verify_password(password, &record.password_hash) {
                Ok(true) => return Ok(Some(record)),
                Ok(false) => debug!("Password mismatch in {} namespace", role),
                Err(e) => warn!("Unreadable {} password hash for {}: {}", role, identifier, e),
            }
        }

        Ok(None)
    }

    async fn display_name(&self, credential: &CredentialRecord) -> Result<Option<String>, AuthError> {
        let name = match credential.role {
            Role::Admin => None,
            Role::Practitioner => self
                .store
                .get_practitioner(credential.principal_id)
                .await?
                .map(|p| p.display_name),
            Role::Patient => self
                .store
                .get_patient(credential.principal_id)
                .await?
                .map(|p| p.display_name),
        };
        Ok(name)
    }
}
