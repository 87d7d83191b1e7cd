// =====================================================================================
// SECURITY CELL - ACCESS DECISIONS & CREDENTIAL HASHING
// =====================================================================================
//
// The single place where role and relationship rules are evaluated. Other cells
// ask the `RelationshipAuthorizer`; they never compare roles themselves.
//
// =====================================================================================

pub mod models;
pub mod services;

pub use models::{AccessError, PasswordStrength, PasswordStrengthResult};
pub use services::{PasswordSecurityService, RelationshipAuthorizer};
