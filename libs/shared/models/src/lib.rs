pub mod auth;
pub mod error;
pub mod people;
pub mod scheduling;
