use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailAddressError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PersonName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for outgoing e-mail
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailDeliveryError {
    #[error("Failed to build email message: {0}")]
    InvalidMessage(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// Top-level error for all authentication operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // Caller-facing failures
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    // Infrastructure errors
    #[error("Email delivery failed: {0}")]
    Email(#[from] EmailDeliveryError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<auth::TokenError> for AuthError {
    fn from(err: auth::TokenError) -> Self {
        match err {
            auth::TokenError::InvalidToken => AuthError::InvalidToken,
            auth::TokenError::InvalidResetToken => AuthError::InvalidResetToken,
            auth::TokenError::Encoding(msg) => AuthError::Unknown(msg),
        }
    }
}

impl From<auth::PasswordError> for AuthError {
    fn from(err: auth::PasswordError) -> Self {
        match err {
            auth::PasswordError::TooShort { .. } => AuthError::ValidationFailed(err.to_string()),
            _ => AuthError::Unknown(err.to_string()),
        }
    }
}

impl From<auth::OtpError> for AuthError {
    fn from(_: auth::OtpError) -> Self {
        AuthError::InvalidOtp
    }
}

impl From<AccountIdError> for AuthError {
    fn from(err: AccountIdError) -> Self {
        AuthError::ValidationFailed(err.to_string())
    }
}

impl From<EmailAddressError> for AuthError {
    fn from(err: EmailAddressError) -> Self {
        AuthError::ValidationFailed(err.to_string())
    }
}

impl From<NameError> for AuthError {
    fn from(err: NameError) -> Self {
        AuthError::ValidationFailed(err.to_string())
    }
}
