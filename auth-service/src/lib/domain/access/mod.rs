pub mod models;
pub mod policy;

pub use models::Permission;
pub use policy::check_ownership;
pub use policy::AccessDenied;
pub use policy::AccessRule;
