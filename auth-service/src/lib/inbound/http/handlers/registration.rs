use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::session_response;
use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use super::VerifyOtpRequest;
use crate::domain::principal::errors::EmailAddressError;
use crate::domain::principal::errors::NameError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Password;
use crate::domain::principal::models::PersonName;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::RegistrationOutcome;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref outcome| ApiSuccess::new(StatusCode::CREATED, outcome.into()))
}

pub async fn verify_registration(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    let (email, otp, _) = body.try_into_parts()?;

    let session = state.auth_service.verify_registration(&email, &otp).await?;
    Ok(session_response(&state, jar, &session))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailAddressError),

    #[error("Invalid password: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Invalid name: {0}")]
    Name(#[from] NameError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        Ok(RegisterCommand {
            email: EmailAddress::new(self.email)?,
            password: Password::new(self.password)?,
            first_name: PersonName::new(self.first_name)?,
            last_name: PersonName::new(self.last_name)?,
        })
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub user: AccountData,
    pub message: String,
}

impl From<&RegistrationOutcome> for RegisterResponseData {
    fn from(outcome: &RegistrationOutcome) -> Self {
        Self {
            user: (&outcome.account).into(),
            message: outcome.message.to_string(),
        }
    }
}
