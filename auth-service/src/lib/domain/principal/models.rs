use std::fmt;
use std::str::FromStr;

use auth::PrincipalKind;
use auth::RefreshLifetime;
use auth::TokenPair;
use auth::TokenSubject;
use auth::VerifiedToken;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::principal::errors::AccountIdError;
use crate::domain::principal::errors::EmailAddressError;
use crate::domain::principal::errors::NameError;

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validated with an RFC 5322 parser, then trimmed and lower-cased so that
/// lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailAddressError> {
        let normalized = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailAddressError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that passed the acceptance policy.
///
/// Only credential stores turn it into a hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// # Errors
    /// * `TooShort` - Fewer than eight characters
    pub fn new(raw: String) -> Result<Self, auth::PasswordError> {
        auth::PasswordPolicy::default().check(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(******)")
    }
}

/// Given or family name. Trimmed, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Role of a regular user. Free-form, lower-case, `user` by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRole(String);

impl UserRole {
    pub const DEFAULT: &'static str = "user";

    pub fn new(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            Self::default()
        } else {
            Self(name)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

/// Admin role, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdminRole {
    Other,
    Agency,
    RegisteredUser,
    Editor,
    ContentManager,
    SuperAdmin,
}

impl AdminRole {
    pub const ALL: [AdminRole; 6] = [
        AdminRole::SuperAdmin,
        AdminRole::ContentManager,
        AdminRole::Editor,
        AdminRole::RegisteredUser,
        AdminRole::Agency,
        AdminRole::Other,
    ];

    /// Integer rank used by "at least this privileged" checks.
    pub fn level(&self) -> u8 {
        match self {
            AdminRole::SuperAdmin => 5,
            AdminRole::ContentManager => 4,
            AdminRole::Editor => 3,
            AdminRole::RegisteredUser => 2,
            AdminRole::Agency => 1,
            AdminRole::Other => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::ContentManager => "content_manager",
            AdminRole::Editor => "editor",
            AdminRole::RegisteredUser => "registered_user",
            AdminRole::Agency => "agency",
            AdminRole::Other => "other",
        }
    }

    /// Resolve a stored or claimed role name. Unknown names rank lowest.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == name)
            .unwrap_or(AdminRole::Other)
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of any account. The principal kind follows from the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    User(UserRole),
    Admin(AdminRole),
}

impl Role {
    pub fn from_name(kind: PrincipalKind, name: &str) -> Self {
        match kind {
            PrincipalKind::User => Role::User(UserRole::new(name)),
            PrincipalKind::Admin => Role::Admin(AdminRole::from_name(name)),
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Role::User(_) => PrincipalKind::User,
            Role::Admin(_) => PrincipalKind::Admin,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::User(role) => role.as_str(),
            Role::Admin(role) => role.as_str(),
        }
    }
}

/// Credential record as seen outside the store.
///
/// Carries neither the password hash nor the pending one-time code.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn kind(&self) -> PrincipalKind {
        self.role.kind()
    }

    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id.to_string(),
            email: self.email.as_str().to_string(),
            role: self.role.as_str().to_string(),
        }
    }
}

/// Authenticated identity of a regular user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: AccountId,
    pub email: String,
    pub role: UserRole,
}

/// Authenticated identity of an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub id: AccountId,
    pub email: String,
    pub role: AdminRole,
}

/// The principal attached to a request once its token verified.
///
/// A single context slot: code that cares whether the caller is an admin
/// matches on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(UserIdentity),
    Admin(AdminIdentity),
}

impl Principal {
    /// Build a principal from verified token claims.
    ///
    /// # Errors
    /// * `InvalidFormat` - Token subject is not an account UUID
    pub fn from_token(token: &VerifiedToken) -> Result<Self, AccountIdError> {
        let id = AccountId::from_string(&token.subject.id)?;
        let email = token.subject.email.clone();

        Ok(match token.kind {
            PrincipalKind::User => Principal::User(UserIdentity {
                id,
                email,
                role: UserRole::new(&token.subject.role),
            }),
            PrincipalKind::Admin => Principal::Admin(AdminIdentity {
                id,
                email,
                role: AdminRole::from_name(&token.subject.role),
            }),
        })
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::User(_) => PrincipalKind::User,
            Principal::Admin(_) => PrincipalKind::Admin,
        }
    }

    pub fn id(&self) -> &AccountId {
        match self {
            Principal::User(identity) => &identity.id,
            Principal::Admin(identity) => &identity.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::User(identity) => &identity.email,
            Principal::Admin(identity) => &identity.email,
        }
    }

    pub fn role_name(&self) -> &str {
        match self {
            Principal::User(identity) => identity.role.as_str(),
            Principal::Admin(identity) => identity.role.as_str(),
        }
    }
}

/// Why a one-time code was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Registration,
    Login,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Registration => "registration",
            OtpPurpose::Login => "login",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }
}

/// Record to insert into the credential store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: EmailAddress,
    pub password: Password,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: Role,
    pub is_verified: bool,
}

/// Command to register a new user.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

/// Command to create the bootstrap admin account.
#[derive(Debug, Clone)]
pub struct ProvisionAdminCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: AdminRole,
}

/// Optional profile changes. Role and password are not reachable here.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
}

/// Returned by `register`: account created, code on its way.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub account: Account,
    pub message: &'static str,
}

/// Returned by `login`: the password was right, now prove the mailbox.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub account: Account,
    pub message: &'static str,
    pub requires_otp: bool,
}

/// Returned when a flow ends in freshly minted tokens.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub account: Account,
    pub tokens: TokenPair,
    pub refresh_lifetime: RefreshLifetime,
    pub message: &'static str,
}

/// Returned by `verify_forgot_password_otp`.
#[derive(Debug, Clone)]
pub struct ResetTicketIssued {
    pub reset_token: String,
    pub message: &'static str,
}
