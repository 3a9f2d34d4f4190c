use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponseData;
use super::VerifyOtpRequest;
use crate::domain::principal::errors::AuthError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Password;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::ResetTicketIssued;
use crate::inbound::http::router::AppState;

const PASSWORD_RESET_MESSAGE: &str = "Password reset successfully";
const PASSWORD_CHANGED_MESSAGE: &str = "Password changed successfully";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    let email = EmailAddress::new(body.email).map_err(AuthError::from)?;

    let message = state.auth_service.forgot_password(&email).await?;
    Ok(ApiSuccess::new(StatusCode::OK, MessageResponseData::new(message)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetTicketResponseData {
    #[serde(rename = "resetToken")]
    pub reset_token: String,
    pub message: String,
}

impl From<&ResetTicketIssued> for ResetTicketResponseData {
    fn from(issued: &ResetTicketIssued) -> Self {
        Self {
            reset_token: issued.reset_token.clone(),
            message: issued.message.to_string(),
        }
    }
}

pub async fn verify_forgot_password_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<ApiSuccess<ResetTicketResponseData>, ApiError> {
    let (email, otp, _) = body.try_into_parts()?;

    state
        .auth_service
        .verify_forgot_password_otp(&email, &otp)
        .await
        .map_err(ApiError::from)
        .map(|ref issued| ApiSuccess::new(StatusCode::OK, issued.into()))
}

/// Reset ticket plus the password it unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    token: String,
    password: String,
}

pub async fn reset_password_with_otp(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    let password = Password::new(body.password).map_err(AuthError::from)?;

    state
        .auth_service
        .reset_password_with_otp(&body.token, password)
        .await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponseData::new(PASSWORD_RESET_MESSAGE),
    ))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    let password = Password::new(body.password).map_err(AuthError::from)?;

    state.auth_service.reset_password(&body.token, password).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponseData::new(PASSWORD_RESET_MESSAGE),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    let new_password = Password::new(body.new_password).map_err(AuthError::from)?;

    state
        .auth_service
        .change_password(&principal, &body.current_password, new_password)
        .await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponseData::new(PASSWORD_CHANGED_MESSAGE),
    ))
}
