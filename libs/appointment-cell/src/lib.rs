pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AppointmentListQuery, AvailabilityQuery, AvailabilityResponse, BookAppointmentRequest, BookingError};
pub use router::appointment_routes;
pub use services::BookingCoordinator;
