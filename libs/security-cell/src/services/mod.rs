pub mod authorizer;
pub mod password;

pub use authorizer::RelationshipAuthorizer;
pub use password::PasswordSecurityService;
