pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::PrincipalClaims;
pub use claims::ResetClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;
