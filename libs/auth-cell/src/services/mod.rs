pub mod credentials;
pub mod login;

pub use credentials::CredentialService;
pub use login::LoginService;
