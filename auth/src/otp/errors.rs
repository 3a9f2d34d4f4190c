use thiserror::Error;

/// Error for submitted one-time codes that are not well formed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OtpError {
    #[error("OTP must be exactly {expected} digits")]
    InvalidFormat { expected: usize },
}
