use async_trait::async_trait;
use auth::OtpCode;
use auth::PrincipalKind;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::principal::errors::AuthError;
use crate::domain::principal::errors::EmailDeliveryError;
use crate::domain::principal::models::Account;
use crate::domain::principal::models::AccountId;
use crate::domain::principal::models::AuthenticatedSession;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::NewAccount;
use crate::domain::principal::models::OtpChallenge;
use crate::domain::principal::models::OtpPurpose;
use crate::domain::principal::models::Password;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::ProfileChanges;
use crate::domain::principal::models::ProvisionAdminCommand;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::RegistrationOutcome;
use crate::domain::principal::models::ResetTicketIssued;

/// Port for authentication domain service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create an unverified user and send a registration code.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Email` - Code could not be delivered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<RegistrationOutcome, AuthError>;

    /// Consume the registration code and open a session.
    ///
    /// # Errors
    /// * `NotFound` - No user with this email
    /// * `InvalidOtp` - Code is wrong, expired, already used or was issued
    ///   by another flow
    /// * `AccountDeactivated` - Account was disabled
    async fn verify_registration(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
    ) -> Result<AuthenticatedSession, AuthError>;

    /// Check the password and send a login code. Never returns tokens.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `AccountDeactivated` - Password was right but the account is disabled
    /// * `Email` - Code could not be delivered
    async fn login(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
        password: &str,
    ) -> Result<OtpChallenge, AuthError>;

    /// Consume the login code and open a session.
    ///
    /// # Arguments
    /// * `remember_me` - Mint a long-lived refresh token
    ///
    /// # Errors
    /// * `NotFound` - No account with this email
    /// * `InvalidOtp` - Code is wrong, expired, already used or was issued
    ///   by another flow
    /// * `AccountDeactivated` - Account was disabled
    async fn verify_login(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
        otp: &OtpCode,
        remember_me: bool,
    ) -> Result<AuthenticatedSession, AuthError>;

    /// Send a password reset code if the email belongs to an active user.
    ///
    /// # Returns
    /// The same message whether or not the account exists
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn forgot_password(&self, email: &EmailAddress) -> Result<&'static str, AuthError>;

    /// Consume the password reset code and mint a reset ticket.
    ///
    /// # Errors
    /// * `NotFound` - No user with this email
    /// * `InvalidOtp` - Code is wrong, expired, already used or was issued
    ///   by another flow
    /// * `AccountDeactivated` - Account was disabled
    async fn verify_forgot_password_otp(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
    ) -> Result<ResetTicketIssued, AuthError>;

    /// Set a new password using a ticket minted by `verify_forgot_password_otp`.
    ///
    /// # Errors
    /// * `InvalidResetToken` - Ticket is malformed, expired, of the wrong
    ///   type or already used
    /// * `NotFound` - Ticket subject no longer exists
    async fn reset_password_with_otp(&self, ticket: &str, password: Password) -> Result<(), AuthError>;

    /// Older reset endpoint. Also accepts tickets from the e-mail link flow.
    ///
    /// # Errors
    /// * `InvalidResetToken` - Ticket is malformed, expired, of an unknown
    ///   type or already used
    /// * `NotFound` - Ticket subject no longer exists
    async fn reset_password(&self, ticket: &str, password: Password) -> Result<(), AuthError>;

    /// Mint a fresh pair for a principal whose refresh token verified.
    ///
    /// # Errors
    /// * `InvalidToken` - Account vanished or was deactivated
    async fn refresh(&self, principal: &Principal) -> Result<AuthenticatedSession, AuthError>;

    /// Acknowledge a logout. Tokens stay valid until they expire.
    async fn logout(&self, principal: &Principal) -> Result<(), AuthError>;

    /// # Errors
    /// * `NotFound` - Account no longer exists
    async fn profile(&self, principal: &Principal) -> Result<Account, AuthError>;

    /// Update names. Role and password are not reachable through here.
    ///
    /// # Errors
    /// * `NotFound` - Account no longer exists
    async fn update_profile(
        &self,
        principal: &Principal,
        changes: ProfileChanges,
    ) -> Result<Account, AuthError>;

    /// # Errors
    /// * `InvalidCredentials` - Current password is wrong
    /// * `NotFound` - Account no longer exists
    async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: Password,
    ) -> Result<(), AuthError>;

    /// Create the admin account unless one with the same email exists.
    ///
    /// # Returns
    /// The created or existing admin account
    async fn provision_admin(&self, command: ProvisionAdminCommand) -> Result<Account, AuthError>;
}

/// Persistence for user and admin credential records.
///
/// Users and admins live in separate collections; every operation names
/// the kind it works on. Password hashes and pending codes never leave
/// the store.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new record, hashing its password. The kind follows the
    /// role.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered for that kind
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError>;

    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
    ) -> Result<Option<Account>, AuthError>;

    async fn find_by_email(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AuthError>;

    /// Check a plaintext password against the stored hash.
    ///
    /// # Returns
    /// `false` for a wrong password or a missing record
    async fn verify_password(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        password: &str,
    ) -> Result<bool, AuthError>;

    /// Hash and store a new password, stamping `password_changed_at`.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    async fn set_password(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        password: &Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Store a code, the flow it was issued for and its expiry, replacing
    /// any pending code.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    async fn set_otp(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        code: &OtpCode,
        purpose: OtpPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Atomically consume a pending code.
    ///
    /// When the code matches, was issued for `purpose` and has not expired
    /// at `now`, clears it and marks the record verified.
    ///
    /// # Returns
    /// `true` if the code was consumed; `false` with no change otherwise
    async fn consume_otp(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        code: &OtpCode,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthError>;

    async fn update_last_login(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// # Errors
    /// * `NotFound` - Record does not exist
    async fn update_profile(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        changes: &ProfileChanges,
    ) -> Result<Account, AuthError>;
}

/// Outgoing e-mail.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Deliver a one-time code.
    ///
    /// # Errors
    /// * `InvalidMessage` - Address or content rejected by the builder
    /// * `SendFailed` - Transport failure
    async fn send_otp(
        &self,
        to: &EmailAddress,
        code: &OtpCode,
        purpose: OtpPurpose,
    ) -> Result<(), EmailDeliveryError>;

    /// Deliver an arbitrary HTML notification.
    ///
    /// # Errors
    /// * `InvalidMessage` - Address or content rejected by the builder
    /// * `SendFailed` - Transport failure
    async fn send_custom_email(
        &self,
        to: &EmailAddress,
        subject: &str,
        html: &str,
    ) -> Result<(), EmailDeliveryError>;
}
