use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub session_jwt_secret: String,
    pub session_token_ttl_seconds: i64,
    /// Allow booking a (practitioner, date, time) that has no managed slot row.
    pub allow_unmanaged_slots: bool,
    pub bind_address: String,
    pub bootstrap_admin_identifier: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            session_jwt_secret: String::new(),
            session_token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            allow_unmanaged_slots: false,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            bootstrap_admin_identifier: None,
            bootstrap_admin_password: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, falling back to the in-memory store");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            session_jwt_secret: env::var("SESSION_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SESSION_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            session_token_ttl_seconds: parse_or("SESSION_TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS),
            allow_unmanaged_slots: parse_or("ALLOW_UNMANAGED_SLOTS", false),
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            bootstrap_admin_identifier: env::var("BOOTSTRAP_ADMIN_IDENTIFIER").ok(),
            bootstrap_admin_password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - session tokens cannot be issued");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.session_jwt_secret.is_empty() && self.session_token_ttl_seconds > 0
    }

    pub fn uses_supabase(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.bootstrap_admin_identifier, &self.bootstrap_admin_password) {
            (Some(identifier), Some(password)) if !identifier.is_empty() && !password.is_empty() => {
                Some((identifier.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
