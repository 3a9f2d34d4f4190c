use std::sync::Arc;

use async_trait::async_trait;
use auth::OtpCode;
use auth::PrincipalKind;
use auth::RefreshLifetime;
use auth::ResetTicketTag;
use auth::TokenService;
use chrono::Duration;
use chrono::Utc;

use crate::domain::principal::errors::AuthError;
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
use crate::domain::principal::models::Role;
use crate::domain::principal::models::UserRole;
use crate::domain::principal::ports::AuthServicePort;
use crate::domain::principal::ports::CredentialStore;
use crate::domain::principal::ports::EmailSender;

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with this email exists, an OTP has been sent.";

const PASSWORD_CHANGED_SUBJECT: &str = "Your password was changed";
const PASSWORD_CHANGED_HTML: &str = "<p>Your password has been reset successfully.</p>\
    <p>If you did not request this change, contact support immediately.</p>";

/// Domain service implementation for authentication flows.
///
/// Every flow that ends in tokens passes through a one-time code first.
pub struct AuthService<CS, ES>
where
    CS: CredentialStore,
    ES: EmailSender,
{
    store: Arc<CS>,
    mailer: Arc<ES>,
    tokens: Arc<TokenService>,
    otp_ttl: Duration,
}

impl<CS, ES> AuthService<CS, ES>
where
    CS: CredentialStore,
    ES: EmailSender,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `mailer` - Outgoing e-mail implementation
    /// * `tokens` - Token service shared with the HTTP gate
    /// * `otp_ttl` - How long an issued code stays valid
    pub fn new(store: Arc<CS>, mailer: Arc<ES>, tokens: Arc<TokenService>, otp_ttl: Duration) -> Self {
        Self {
            store,
            mailer,
            tokens,
            otp_ttl,
        }
    }

    async fn issue_otp(&self, account: &Account, purpose: OtpPurpose) -> Result<(), AuthError> {
        let code = OtpCode::generate();
        let expires_at = Utc::now() + self.otp_ttl;

        self.store
            .set_otp(account.kind(), &account.id, &code, purpose, expires_at)
            .await?;

        self.mailer
            .send_otp(&account.email, &code, purpose)
            .await
            .map_err(|e| {
                tracing::error!(
                    account_id = %account.id,
                    purpose = purpose.as_str(),
                    error = %e,
                    "Failed to deliver OTP"
                );
                AuthError::from(e)
            })?;

        tracing::info!(
            account_id = %account.id,
            kind = account.kind().as_str(),
            purpose = purpose.as_str(),
            "OTP issued"
        );
        Ok(())
    }

    async fn consume_otp(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
        otp: &OtpCode,
        purpose: OtpPurpose,
    ) -> Result<Account, AuthError> {
        let mut account = self
            .store
            .find_by_email(kind, email)
            .await?
            .ok_or_else(|| AuthError::NotFound(email.to_string()))?;

        if !self
            .store
            .consume_otp(kind, &account.id, otp, purpose, Utc::now())
            .await?
        {
            tracing::warn!(
                account_id = %account.id,
                kind = kind.as_str(),
                purpose = purpose.as_str(),
                "OTP rejected"
            );
            return Err(AuthError::InvalidOtp);
        }

        // Nothing is minted for a disabled account, whichever flow the code came from.
        if !account.is_active {
            tracing::warn!(account_id = %account.id, kind = kind.as_str(), "OTP for deactivated account");
            return Err(AuthError::AccountDeactivated);
        }

        account.is_verified = true;
        Ok(account)
    }

    fn open_session(
        &self,
        account: Account,
        refresh_lifetime: RefreshLifetime,
        message: &'static str,
    ) -> Result<AuthenticatedSession, AuthError> {
        let tokens = self
            .tokens
            .issue_tokens(account.kind(), &account.token_subject(), refresh_lifetime)?;

        Ok(AuthenticatedSession {
            account,
            tokens,
            refresh_lifetime,
            message,
        })
    }

    async fn load(&self, principal: &Principal) -> Result<Account, AuthError> {
        self.store
            .find_by_id(principal.kind(), principal.id())
            .await?
            .ok_or_else(|| AuthError::NotFound(principal.id().to_string()))
    }

    async fn apply_reset(&self, ticket: &str, password: Password, accept_legacy: bool) -> Result<(), AuthError> {
        let ticket = self.tokens.verify_reset_ticket(ticket, accept_legacy)?;
        let id = AccountId::from_string(&ticket.subject_id).map_err(|_| AuthError::InvalidResetToken)?;

        let account = self
            .store
            .find_by_id(PrincipalKind::User, &id)
            .await?
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?;

        // A ticket only works for the password it was minted against.
        if let Some(changed_at) = account.password_changed_at {
            if changed_at.timestamp() >= ticket.issued_at {
                tracing::warn!(account_id = %id, "Reset ticket replayed");
                return Err(AuthError::InvalidResetToken);
            }
        }

        self.store
            .set_password(PrincipalKind::User, &id, &password, Utc::now())
            .await?;
        tracing::info!(account_id = %id, tag = ticket.tag.as_str(), "Password reset");

        if let Err(e) = self
            .mailer
            .send_custom_email(&account.email, PASSWORD_CHANGED_SUBJECT, PASSWORD_CHANGED_HTML)
            .await
        {
            tracing::error!(account_id = %id, error = %e, "Failed to send password change notice");
        }

        Ok(())
    }
}

#[async_trait]
impl<CS, ES> AuthServicePort for AuthService<CS, ES>
where
    CS: CredentialStore,
    ES: EmailSender,
{
    async fn register(&self, command: RegisterCommand) -> Result<RegistrationOutcome, AuthError> {
        if self
            .store
            .find_by_email(PrincipalKind::User, &command.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailAlreadyExists(command.email.to_string()));
        }

        let account = self
            .store
            .create(NewAccount {
                email: command.email,
                password: command.password,
                first_name: command.first_name,
                last_name: command.last_name,
                role: Role::User(UserRole::default()),
                is_verified: false,
            })
            .await?;
        tracing::info!(account_id = %account.id, "User registered");

        self.issue_otp(&account, OtpPurpose::Registration).await?;

        Ok(RegistrationOutcome {
            account,
            message: "Registration successful. Please check your email for OTP verification.",
        })
    }

    async fn verify_registration(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
    ) -> Result<AuthenticatedSession, AuthError> {
        let account = self
            .consume_otp(PrincipalKind::User, email, otp, OtpPurpose::Registration)
            .await?;
        self.open_session(account, RefreshLifetime::Standard, "Email verified successfully")
    }

    async fn login(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
        password: &str,
    ) -> Result<OtpChallenge, AuthError> {
        let Some(account) = self.store.find_by_email(kind, email).await? else {
            tracing::warn!(kind = kind.as_str(), "Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.store.verify_password(kind, &account.id, password).await? {
            tracing::warn!(account_id = %account.id, kind = kind.as_str(), "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        self.issue_otp(&account, OtpPurpose::Login).await?;

        Ok(OtpChallenge {
            account,
            message: "OTP sent to your email for verification",
            requires_otp: true,
        })
    }

    async fn verify_login(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
        otp: &OtpCode,
        remember_me: bool,
    ) -> Result<AuthenticatedSession, AuthError> {
        let mut account = self.consume_otp(kind, email, otp, OtpPurpose::Login).await?;

        let now = Utc::now();
        self.store.update_last_login(kind, &account.id, now).await?;
        account.last_login = Some(now);
        tracing::info!(account_id = %account.id, kind = kind.as_str(), remember_me, "Login verified");

        self.open_session(
            account,
            RefreshLifetime::from_remember_me(remember_me),
            "Login successful",
        )
    }

    async fn forgot_password(&self, email: &EmailAddress) -> Result<&'static str, AuthError> {
        match self.store.find_by_email(PrincipalKind::User, email).await? {
            Some(account) if !account.is_active => {
                tracing::debug!(account_id = %account.id, "Password reset requested for deactivated account");
            }
            Some(account) => {
                // Delivery problems must not change the response.
                if let Err(e) = self.issue_otp(&account, OtpPurpose::PasswordReset).await {
                    if !matches!(e, AuthError::Email(_)) {
                        return Err(e);
                    }
                }
            }
            None => tracing::debug!("Password reset requested for unknown email"),
        }

        Ok(FORGOT_PASSWORD_MESSAGE)
    }

    async fn verify_forgot_password_otp(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
    ) -> Result<ResetTicketIssued, AuthError> {
        let account = self
            .consume_otp(PrincipalKind::User, email, otp, OtpPurpose::PasswordReset)
            .await?;
        let reset_token = self
            .tokens
            .issue_reset_ticket(&account.id.to_string(), ResetTicketTag::Otp)?;

        Ok(ResetTicketIssued {
            reset_token,
            message: "OTP verified successfully. You can now reset your password.",
        })
    }

    async fn reset_password_with_otp(&self, ticket: &str, password: Password) -> Result<(), AuthError> {
        self.apply_reset(ticket, password, false).await
    }

    async fn reset_password(&self, ticket: &str, password: Password) -> Result<(), AuthError> {
        self.apply_reset(ticket, password, true).await
    }

    async fn refresh(&self, principal: &Principal) -> Result<AuthenticatedSession, AuthError> {
        let account = self
            .store
            .find_by_id(principal.kind(), principal.id())
            .await?
            .filter(|account| account.is_active)
            .ok_or_else(|| {
                tracing::warn!(account_id = %principal.id(), "Refresh for missing or inactive account");
                AuthError::InvalidToken
            })?;

        self.open_session(account, RefreshLifetime::Standard, "Token refreshed successfully")
    }

    async fn logout(&self, principal: &Principal) -> Result<(), AuthError> {
        tracing::info!(
            account_id = %principal.id(),
            kind = principal.kind().as_str(),
            "Logged out"
        );
        Ok(())
    }

    async fn profile(&self, principal: &Principal) -> Result<Account, AuthError> {
        self.load(principal).await
    }

    async fn update_profile(
        &self,
        principal: &Principal,
        changes: ProfileChanges,
    ) -> Result<Account, AuthError> {
        self.store
            .update_profile(principal.kind(), principal.id(), &changes)
            .await
    }

    async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: Password,
    ) -> Result<(), AuthError> {
        let account = self.load(principal).await?;

        if !self
            .store
            .verify_password(account.kind(), &account.id, current_password)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .set_password(account.kind(), &account.id, &new_password, Utc::now())
            .await?;
        tracing::info!(account_id = %account.id, kind = account.kind().as_str(), "Password changed");
        Ok(())
    }

    async fn provision_admin(&self, command: ProvisionAdminCommand) -> Result<Account, AuthError> {
        if let Some(existing) = self
            .store
            .find_by_email(PrincipalKind::Admin, &command.email)
            .await?
        {
            tracing::debug!(account_id = %existing.id, "Bootstrap admin already present");
            return Ok(existing);
        }

        let account = self
            .store
            .create(NewAccount {
                email: command.email,
                password: command.password,
                first_name: command.first_name,
                last_name: command.last_name,
                role: Role::Admin(command.role),
                is_verified: true,
            })
            .await?;
        tracing::info!(account_id = %account.id, role = account.role.as_str(), "Bootstrap admin created");
        Ok(account)
    }
}
