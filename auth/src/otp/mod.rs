pub mod code;
pub mod errors;

pub use code::OtpCode;
pub use errors::OtpError;
