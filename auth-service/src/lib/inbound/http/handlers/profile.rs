use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::AccountEnvelope;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::principal::errors::AuthError;
use crate::domain::principal::models::PersonName;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::ProfileChanges;
use crate::inbound::http::router::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<ApiSuccess<AccountEnvelope>, ApiError> {
    state
        .auth_service
        .profile(&principal)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

/// The path id has already been matched against the caller, so the
/// caller's own record is what gets returned.
pub async fn get_account(
    state: State<AppState>,
    principal: Extension<Principal>,
) -> Result<ApiSuccess<AccountEnvelope>, ApiError> {
    get_profile(state, principal).await
}

/// Only names are read. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_changes(self) -> Result<ProfileChanges, AuthError> {
        Ok(ProfileChanges {
            first_name: self.first_name.map(PersonName::new).transpose()?,
            last_name: self.last_name.map(PersonName::new).transpose()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateProfileResponseData {
    #[serde(flatten)]
    pub account: AccountEnvelope,
    pub message: String,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<UpdateProfileResponseData>, ApiError> {
    let changes = body.try_into_changes()?;

    let account = state
        .auth_service
        .update_profile(&principal, changes)
        .await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        UpdateProfileResponseData {
            account: (&account).into(),
            message: "Profile updated successfully".to_string(),
        },
    ))
}
