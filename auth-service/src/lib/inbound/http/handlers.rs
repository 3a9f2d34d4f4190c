use auth::OtpCode;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::principal::errors::AuthError;
use crate::domain::principal::models::Account;
use crate::domain::principal::models::AuthenticatedSession;
use crate::domain::principal::models::EmailAddress;
use crate::inbound::http::router::AppState;

pub mod login;
pub mod password;
pub mod profile;
pub mod registration;
pub mod roles;
pub mod session;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::AccountDeactivated => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidOtp | AuthError::InvalidResetToken => {
                ApiError::BadRequest(err.to_string())
            }
            AuthError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AuthError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            AuthError::ValidationFailed(_) => ApiError::UnprocessableEntity(err.to_string()),
            AuthError::Email(_) | AuthError::DatabaseError(_) | AuthError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of an account. No hash, no pending code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            role: account.role.as_str().to_string(),
            is_active: account.is_active,
            is_verified: account.is_verified,
            last_login: account.last_login,
            created_at: account.created_at,
        }
    }
}

/// Account keyed by its kind: `{"user": {...}}` or `{"admin": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountEnvelope {
    User(AccountData),
    Admin(AccountData),
}

impl From<&Account> for AccountEnvelope {
    fn from(account: &Account) -> Self {
        match account.kind() {
            auth::PrincipalKind::User => AccountEnvelope::User(account.into()),
            auth::PrincipalKind::Admin => AccountEnvelope::Admin(account.into()),
        }
    }
}

/// Tokens returned in a body. The refresh token only travels as a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenData {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    #[serde(flatten)]
    pub account: AccountEnvelope,
    pub tokens: AccessTokenData,
    pub message: String,
}

impl From<&AuthenticatedSession> for SessionResponseData {
    fn from(session: &AuthenticatedSession) -> Self {
        Self {
            account: (&session.account).into(),
            tokens: AccessTokenData {
                access_token: session.tokens.access_token.clone(),
            },
            message: session.message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponseData {
    pub message: String,
}

impl MessageResponseData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body shared by every endpoint that consumes a one-time code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyOtpRequest {
    email: String,
    otp: String,
    #[serde(default, rename = "rememberMe")]
    remember_me: bool,
}

impl VerifyOtpRequest {
    fn try_into_parts(self) -> Result<(EmailAddress, OtpCode, bool), ApiError> {
        let email = EmailAddress::new(self.email).map_err(AuthError::from)?;
        let otp = OtpCode::parse(&self.otp)
            .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;
        Ok((email, otp, self.remember_me))
    }
}

/// Puts the refresh token in its cookie and the rest in the body.
fn session_response(
    state: &AppState,
    jar: CookieJar,
    session: &AuthenticatedSession,
) -> (CookieJar, ApiSuccess<SessionResponseData>) {
    let jar = state.cookies.set_refresh(
        jar,
        session.account.kind(),
        session.tokens.refresh_token.clone(),
        session.refresh_lifetime,
    );
    (jar, ApiSuccess::new(StatusCode::OK, session.into()))
}
