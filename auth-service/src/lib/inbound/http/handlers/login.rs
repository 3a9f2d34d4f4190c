use auth::PrincipalKind;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::session_response;
use super::AccountEnvelope;
use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use super::VerifyOtpRequest;
use crate::domain::principal::errors::AuthError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::OtpChallenge;
use crate::inbound::http::router::AppState;

pub async fn user_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    login(state, PrincipalKind::User, body).await
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    login(state, PrincipalKind::Admin, body).await
}

async fn login(
    state: AppState,
    kind: PrincipalKind,
    body: LoginRequest,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // A malformed email cannot match any account.
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::Unauthorized(AuthError::InvalidCredentials.to_string()))?;

    state
        .auth_service
        .login(kind, &email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref challenge| ApiSuccess::new(StatusCode::OK, challenge.into()))
}

pub async fn verify_user_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    verify_login(state, PrincipalKind::User, jar, body).await
}

pub async fn verify_admin_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    verify_login(state, PrincipalKind::Admin, jar, body).await
}

async fn verify_login(
    state: AppState,
    kind: PrincipalKind,
    jar: CookieJar,
    body: VerifyOtpRequest,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    let (email, otp, remember_me) = body.try_into_parts()?;

    let session = state
        .auth_service
        .verify_login(kind, &email, &otp, remember_me)
        .await?;
    Ok(session_response(&state, jar, &session))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    #[serde(flatten)]
    pub account: AccountEnvelope,
    pub message: String,
    #[serde(rename = "requiresOTP")]
    pub requires_otp: bool,
}

impl From<&OtpChallenge> for LoginResponseData {
    fn from(challenge: &OtpChallenge) -> Self {
        Self {
            account: (&challenge.account).into(),
            message: challenge.message.to_string(),
            requires_otp: challenge.requires_otp,
        }
    }
}
