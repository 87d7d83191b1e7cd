pub mod practitioner;

pub use practitioner::PractitionerService;
