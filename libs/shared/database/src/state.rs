use std::sync::Arc;

use tracing::{info, warn};

use shared_config::AppConfig;

use crate::memory::MemoryStore;
use crate::store::ClinicStore;
use crate::supabase_store::SupabaseStore;

/// Router state shared by every cell.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ClinicStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ClinicStore>) -> Self {
        Self { config, store }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    pub fn from_config(config: AppConfig) -> Self {
        if config.uses_supabase() {
            info!("Using Supabase store at {}", config.supabase_url);
            let store = SupabaseStore::new(&config);
            Self::new(config, Arc::new(store))
        } else {
            warn!("Supabase not configured - state will not survive a restart");
            Self::in_memory(config)
        }
    }
}
