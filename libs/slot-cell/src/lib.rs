pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{CreateSlotsRequest, SlotError, SlotQuery, SlotTransition, UpdateSlotStatusRequest};
pub use router::slot_routes;
pub use services::{SlotLifecycle, SlotRegistryService};
