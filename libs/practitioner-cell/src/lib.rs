pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{CreatePractitionerRequest, PractitionerError, UpdatePractitionerRequest};
pub use router::practitioner_routes;
pub use services::PractitionerService;
