//! Authentication primitives shared by the marketplace services
//!
//! Provides the pieces that do not depend on any storage:
//! - Password hashing (Argon2id) and the password acceptance policy
//! - Signed token handling (HS256)
//! - The dual-kind token service (users and admins, access and refresh)
//! - Six digit one-time codes
//!
//! Services own their credential records and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Token pairs
//! ```
//! use auth::{KindSecrets, PrincipalKind, RefreshLifetime, TokenLifetimes, TokenService, TokenSubject};
//!
//! let tokens = TokenService::new(
//!     KindSecrets { access: b"user-access-secret-32-bytes-long!!", refresh: b"user-refresh-secret-32-bytes-long!" },
//!     KindSecrets { access: b"admin-access-secret-32-bytes-long!", refresh: b"admin-refresh-secret-32-bytes-long" },
//!     TokenLifetimes::default(),
//! );
//!
//! let subject = TokenSubject {
//!     id: "42".to_string(),
//!     email: "user@example.com".to_string(),
//!     role: "user".to_string(),
//! };
//! let pair = tokens.issue_tokens(PrincipalKind::User, &subject, RefreshLifetime::Standard).unwrap();
//!
//! assert!(tokens.verify_access(&pair.access_token, PrincipalKind::User).is_ok());
//! assert!(tokens.verify_access(&pair.access_token, PrincipalKind::Admin).is_err());
//! ```
//!
//! ## One-time codes
//! ```
//! use auth::OtpCode;
//!
//! let code = OtpCode::generate();
//! let submitted = OtpCode::parse(code.as_str()).unwrap();
//! assert!(submitted.matches(code.as_str()));
//! ```

pub mod jwt;
pub mod otp;
pub mod password;
pub mod tokens;

// Re-export commonly used items
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use otp::OtpCode;
pub use otp::OtpError;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
pub use tokens::KindSecrets;
pub use tokens::PrincipalKind;
pub use tokens::RefreshLifetime;
pub use tokens::ResetTicket;
pub use tokens::ResetTicketTag;
pub use tokens::TokenError;
pub use tokens::TokenLifetimes;
pub use tokens::TokenPair;
pub use tokens::TokenService;
pub use tokens::TokenSubject;
pub use tokens::VerifiedToken;
