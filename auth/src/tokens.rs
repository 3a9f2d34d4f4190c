use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::PrincipalClaims;
use crate::jwt::ResetClaims;

/// The two kinds of principal a token can be minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    Admin,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::Admin => "admin",
        }
    }
}

/// Signing secrets for one principal kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSecrets<'a> {
    pub access: &'a [u8],
    pub refresh: &'a [u8],
}

/// Token and ticket lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub remember_me: Duration,
    pub reset_ticket: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            remember_me: Duration::days(30),
            reset_ticket: Duration::minutes(10),
        }
    }
}

/// Which refresh lifetime applies to a newly minted pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshLifetime {
    #[default]
    Standard,
    RememberMe,
}

impl RefreshLifetime {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            RefreshLifetime::RememberMe
        } else {
            RefreshLifetime::Standard
        }
    }

    pub fn duration(&self, lifetimes: &TokenLifetimes) -> Duration {
        match self {
            RefreshLifetime::Standard => lifetimes.refresh,
            RefreshLifetime::RememberMe => lifetimes.remember_me,
        }
    }
}

/// What a token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful access or refresh verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub kind: PrincipalKind,
    pub subject: TokenSubject,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Discriminator carried in the `type` claim of a reset ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTicketTag {
    /// Minted after a password-reset OTP was verified.
    Otp,
    /// Issued by the older e-mail link flow; only the legacy reset
    /// endpoint accepts it.
    Legacy,
}

impl ResetTicketTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetTicketTag::Otp => "password_reset_otp",
            ResetTicketTag::Legacy => "password_reset",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "password_reset_otp" => Some(ResetTicketTag::Otp),
            "password_reset" => Some(ResetTicketTag::Legacy),
            _ => None,
        }
    }
}

/// Verified reset ticket contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTicket {
    pub subject_id: String,
    pub tag: ResetTicketTag,
    pub issued_at: i64,
}

/// Token service errors.
///
/// Verification failures never say whether the signature, the expiry or
/// the token shape was at fault.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Failed to sign token: {0}")]
    Encoding(String),
}

struct KindKeys {
    access: JwtHandler,
    refresh: JwtHandler,
}

impl KindKeys {
    fn new(secrets: KindSecrets<'_>) -> Self {
        Self {
            access: JwtHandler::new(secrets.access),
            refresh: JwtHandler::new(secrets.refresh),
        }
    }
}

/// Mints and verifies tokens for users and admins.
///
/// Each kind has its own access and refresh secret. Reset tickets are
/// signed with the user access secret and told apart from access tokens
/// by their `type` claim.
pub struct TokenService {
    user: KindKeys,
    admin: KindKeys,
    lifetimes: TokenLifetimes,
}

impl TokenService {
    pub fn new(user: KindSecrets<'_>, admin: KindSecrets<'_>, lifetimes: TokenLifetimes) -> Self {
        Self {
            user: KindKeys::new(user),
            admin: KindKeys::new(admin),
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    fn keys(&self, kind: PrincipalKind) -> &KindKeys {
        match kind {
            PrincipalKind::User => &self.user,
            PrincipalKind::Admin => &self.admin,
        }
    }

    /// Mint an access/refresh pair as of now.
    ///
    /// # Errors
    /// * `Encoding` - Signing failed
    pub fn issue_tokens(
        &self,
        kind: PrincipalKind,
        subject: &TokenSubject,
        refresh: RefreshLifetime,
    ) -> Result<TokenPair, TokenError> {
        self.issue_tokens_at(kind, subject, refresh, Utc::now())
    }

    /// Mint an access/refresh pair as of `now`.
    ///
    /// Both tokens embed the same subject. The refresh token's `exp`
    /// follows the requested refresh lifetime, so a remember-me cookie
    /// never outlives the token inside it.
    pub fn issue_tokens_at(
        &self,
        kind: PrincipalKind,
        subject: &TokenSubject,
        refresh: RefreshLifetime,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let keys = self.keys(kind);
        let iat = now.timestamp();
        let access_exp = (now + self.lifetimes.access).timestamp();
        let refresh_exp = (now + refresh.duration(&self.lifetimes)).timestamp();

        let access_claims = Self::claims(kind, subject, iat, access_exp);
        let refresh_claims = Self::claims(kind, subject, iat, refresh_exp);

        let access_token = keys.access.encode(&access_claims).map_err(encoding_error)?;
        let refresh_token = keys.refresh.encode(&refresh_claims).map_err(encoding_error)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn claims(kind: PrincipalKind, subject: &TokenSubject, iat: i64, exp: i64) -> PrincipalClaims {
        let (id, email, role) = (
            subject.id.clone(),
            subject.email.clone(),
            subject.role.clone(),
        );
        match kind {
            PrincipalKind::User => PrincipalClaims::for_user(id, email, role, iat, exp),
            PrincipalKind::Admin => PrincipalClaims::for_admin(id, email, role, iat, exp),
        }
    }

    /// Verify an access token for the expected principal kind.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, expired, wrong kind or malformed
    pub fn verify_access(&self, token: &str, kind: PrincipalKind) -> Result<VerifiedToken, TokenError> {
        Self::verify_with(&self.keys(kind).access, token, kind)
    }

    /// Verify a refresh token for the expected principal kind.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, expired, wrong kind or malformed
    pub fn verify_refresh(&self, token: &str, kind: PrincipalKind) -> Result<VerifiedToken, TokenError> {
        Self::verify_with(&self.keys(kind).refresh, token, kind)
    }

    fn verify_with(
        handler: &JwtHandler,
        token: &str,
        kind: PrincipalKind,
    ) -> Result<VerifiedToken, TokenError> {
        let claims: PrincipalClaims = handler.decode(token).map_err(|e| {
            tracing::debug!(kind = kind.as_str(), reason = %e, "Token verification failed");
            TokenError::InvalidToken
        })?;

        let id = match kind {
            PrincipalKind::User => claims.user_id,
            PrincipalKind::Admin => claims
                .admin_id
                .filter(|_| claims.token_type.as_deref() == Some(PrincipalClaims::ADMIN_TYPE)),
        }
        .ok_or_else(|| {
            tracing::debug!(kind = kind.as_str(), "Token subject does not match expected kind");
            TokenError::InvalidToken
        })?;

        Ok(VerifiedToken {
            kind,
            subject: TokenSubject {
                id,
                email: claims.email,
                role: claims.role,
            },
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Mint a reset ticket for a user as of now.
    pub fn issue_reset_ticket(&self, user_id: &str, tag: ResetTicketTag) -> Result<String, TokenError> {
        self.issue_reset_ticket_at(user_id, tag, Utc::now())
    }

    /// Mint a reset ticket for a user as of `now`.
    pub fn issue_reset_ticket_at(
        &self,
        user_id: &str,
        tag: ResetTicketTag,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = ResetClaims {
            user_id: user_id.to_string(),
            token_type: tag.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetimes.reset_ticket).timestamp(),
        };
        self.user.access.encode(&claims).map_err(encoding_error)
    }

    /// Verify a reset ticket and check its tag.
    ///
    /// # Arguments
    /// * `token` - Ticket string
    /// * `accept_legacy` - Whether `password_reset` tickets are accepted
    ///
    /// # Errors
    /// * `InvalidResetToken` - Bad signature, expired, missing or
    ///   unaccepted tag
    pub fn verify_reset_ticket(&self, token: &str, accept_legacy: bool) -> Result<ResetTicket, TokenError> {
        let claims: ResetClaims = self.user.access.decode(token).map_err(|e| {
            tracing::debug!(reason = %e, "Reset ticket verification failed");
            TokenError::InvalidResetToken
        })?;

        let tag = ResetTicketTag::parse(&claims.token_type)
            .filter(|tag| *tag == ResetTicketTag::Otp || accept_legacy)
            .ok_or(TokenError::InvalidResetToken)?;

        Ok(ResetTicket {
            subject_id: claims.user_id,
            tag,
            issued_at: claims.iat,
        })
    }
}

fn encoding_error(e: JwtError) -> TokenError {
    TokenError::Encoding(e.to_string())
}
