use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::AccessTokenData;
use super::ApiError;
use super::ApiSuccess;
use super::MessageResponseData;
use crate::domain::principal::models::Principal;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    #[serde(flatten)]
    pub tokens: AccessTokenData,
    pub message: String,
}

/// Rotates the pair for the principal the refresh cookie named.
pub async fn refresh_token(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<RefreshResponseData>), ApiError> {
    let session = state.auth_service.refresh(&principal).await?;

    let jar = state.cookies.set_refresh(
        jar,
        principal.kind(),
        session.tokens.refresh_token.clone(),
        session.refresh_lifetime,
    );
    let data = RefreshResponseData {
        tokens: AccessTokenData {
            access_token: session.tokens.access_token,
        },
        message: session.message.to_string(),
    };

    Ok((jar, ApiSuccess::new(StatusCode::OK, data)))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<MessageResponseData>), ApiError> {
    state.auth_service.logout(&principal).await?;

    let jar = state.cookies.clear_refresh(jar, principal.kind());
    Ok((
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            MessageResponseData::new("Logged out successfully"),
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentSessionData {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionIdentity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// Reports who is calling, if anyone. Reads the token claims only.
pub async fn current_session(
    principal: Option<Extension<Principal>>,
) -> ApiSuccess<CurrentSessionData> {
    let user = principal.map(|Extension(principal)| SessionIdentity {
        id: principal.id().to_string(),
        email: principal.email().to_string(),
        role: principal.role_name().to_string(),
    });

    ApiSuccess::new(
        StatusCode::OK,
        CurrentSessionData {
            authenticated: user.is_some(),
            user,
        },
    )
}
