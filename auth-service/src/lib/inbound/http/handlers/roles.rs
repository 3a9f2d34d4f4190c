use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::principal::models::Account;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::Role;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleLevelData {
    #[serde(rename = "roleLevel")]
    pub role_level: u8,
    pub role: String,
}

fn level_of(account: &Account) -> u8 {
    match &account.role {
        Role::Admin(role) => role.level(),
        Role::User(_) => 0,
    }
}

/// Role and level come from the stored record, not the token.
pub async fn role_level(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<ApiSuccess<RoleLevelData>, ApiError> {
    let account = state.auth_service.profile(&principal).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RoleLevelData {
            role_level: level_of(&account),
            role: account.role.as_str().to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HasRoleData {
    #[serde(rename = "hasRole")]
    pub has_role: bool,
}

pub async fn check_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role): Path<String>,
) -> Result<ApiSuccess<HasRoleData>, ApiError> {
    let account = state.auth_service.profile(&principal).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        HasRoleData {
            has_role: account.role.as_str() == role,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckAnyRoleRequest {
    roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HasAnyRoleData {
    #[serde(rename = "hasAnyRole")]
    pub has_any_role: bool,
}

pub async fn check_any_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CheckAnyRoleRequest>,
) -> Result<ApiSuccess<HasAnyRoleData>, ApiError> {
    if body.roles.is_empty() {
        return Err(ApiError::BadRequest("Roles array is required".to_string()));
    }

    let account = state.auth_service.profile(&principal).await?;
    let current = account.role.as_str();

    Ok(ApiSuccess::new(
        StatusCode::OK,
        HasAnyRoleData {
            has_any_role: body.roles.iter().any(|role| role == current),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatedAreaData {
    pub message: String,
    pub role: String,
}

fn granted(principal: &Principal, area: &str) -> ApiSuccess<GatedAreaData> {
    ApiSuccess::new(
        StatusCode::OK,
        GatedAreaData {
            message: format!("Access granted to {}", area),
            role: principal.role_name().to_string(),
        },
    )
}

// The handlers below do nothing beyond reporting that their gate let the
// caller through. Each route carries its own access rule.

pub async fn super_admin_only(Extension(principal): Extension<Principal>) -> ApiSuccess<GatedAreaData> {
    granted(&principal, "super admin area")
}

pub async fn content_manager_plus(
    Extension(principal): Extension<Principal>,
) -> ApiSuccess<GatedAreaData> {
    granted(&principal, "content management area")
}

pub async fn editor_plus(Extension(principal): Extension<Principal>) -> ApiSuccess<GatedAreaData> {
    granted(&principal, "editorial area")
}

pub async fn managers(Extension(principal): Extension<Principal>) -> ApiSuccess<GatedAreaData> {
    granted(&principal, "managers area")
}

pub async fn senior_staff(Extension(principal): Extension<Principal>) -> ApiSuccess<GatedAreaData> {
    granted(&principal, "senior staff area")
}
