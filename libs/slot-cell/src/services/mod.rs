pub mod lifecycle;
pub mod registry;

pub use lifecycle::SlotLifecycle;
pub use registry::SlotRegistryService;
