pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

// Re-export commonly used types
pub use domain::access;
pub use domain::principal;
pub use domain::principal::models::Principal;
pub use domain::principal::service::AuthService;
