use thiserror::Error;

/// Error type for JWT operations.
///
/// Callers that face the network collapse every decoding variant into a
/// single "invalid or expired" answer; the variants exist for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    InvalidSignature,
}
