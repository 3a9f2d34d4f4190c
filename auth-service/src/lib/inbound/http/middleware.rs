use auth::PrincipalKind;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::cookies::refresh_cookie_name;
use crate::domain::access::check_ownership;
use crate::domain::access::AccessDenied;
use crate::domain::access::AccessRule;
use crate::domain::principal::models::AccountId;
use crate::domain::principal::models::Principal;
use crate::inbound::http::router::AppState;

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn missing_token_message(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::User => "Access token required",
        PrincipalKind::Admin => "Admin access token required",
    }
}

fn invalid_token_message(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::User => "Invalid or expired token",
        PrincipalKind::Admin => "Invalid or expired admin token",
    }
}

/// Middleware that validates a user access token and attaches the principal
pub async fn authenticate_user(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    authenticate(state, PrincipalKind::User, req, next).await
}

/// Middleware that validates an admin access token and attaches the principal
pub async fn authenticate_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    authenticate(state, PrincipalKind::Admin, req, next).await
}

async fn authenticate(
    state: AppState,
    kind: PrincipalKind,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req, kind)?;

    let verified = state.tokens.verify_access(token, kind).map_err(|e| {
        tracing::warn!(kind = kind.as_str(), error = %e, "Access token rejected");
        reject(StatusCode::UNAUTHORIZED, invalid_token_message(kind))
    })?;

    let principal = Principal::from_token(&verified).map_err(|e| {
        tracing::error!(kind = kind.as_str(), error = %e, "Failed to parse account ID from token");
        reject(StatusCode::UNAUTHORIZED, "Invalid token format")
    })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Attaches a user principal when a valid token is present. Never rejects.
pub async fn optional_user(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let principal = bearer_token(&req)
        .and_then(|token| state.tokens.verify_access(token, PrincipalKind::User).ok())
        .and_then(|verified| Principal::from_token(&verified).ok());

    if let Some(principal) = principal {
        req.extensions_mut().insert(principal);
    }

    next.run(req).await
}

/// Middleware that validates the user refresh cookie
pub async fn refresh_user(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    authenticate_refresh(state, PrincipalKind::User, req, next).await
}

/// Middleware that validates the admin refresh cookie
pub async fn refresh_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    authenticate_refresh(state, PrincipalKind::Admin, req, next).await
}

async fn authenticate_refresh(
    state: AppState,
    kind: PrincipalKind,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let (missing, invalid) = match kind {
        PrincipalKind::User => ("Refresh token required", "Invalid or expired refresh token"),
        PrincipalKind::Admin => (
            "Admin refresh token required",
            "Invalid or expired admin refresh token",
        ),
    };

    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(refresh_cookie_name(kind))
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, missing))?;

    let principal = state
        .tokens
        .verify_refresh(&token, kind)
        .ok()
        .and_then(|verified| Principal::from_token(&verified).ok())
        .ok_or_else(|| {
            tracing::warn!(kind = kind.as_str(), "Refresh token rejected");
            reject(StatusCode::UNAUTHORIZED, invalid)
        })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Enforces a route's access rule against the attached principal
pub async fn authorize(
    State(rule): State<AccessRule>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    rule.evaluate(req.extensions().get::<Principal>())
        .map_err(|denied| {
            tracing::warn!(rule = ?rule, denied = ?denied, "Access denied");
            denial_response(&denied)
        })?;

    Ok(next.run(req).await)
}

/// Only lets a user through to records under their own id
pub async fn require_ownership(
    Path(id): Path<String>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let owner = AccountId::from_string(&id)
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "Resource ID required"))?;

    check_ownership(req.extensions().get::<Principal>(), &owner).map_err(|denied| {
        tracing::warn!(resource_id = %owner, "Ownership check failed");
        denial_response(&denied)
    })?;

    Ok(next.run(req).await)
}

fn denial_response(denied: &AccessDenied) -> Response {
    let status = if denied.is_authentication_failure() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::FORBIDDEN
    };

    let body = match denied {
        AccessDenied::InsufficientLevel {
            current_role,
            current_level,
            required_level,
        } => json!({
            "error": denied.message(),
            "currentRole": current_role,
            "currentLevel": current_level,
            "requiredLevel": required_level,
        }),
        AccessDenied::MissingPermission {
            permission,
            current_level,
        } => json!({
            "error": denied.message(),
            "required": permission.as_str(),
            "currentLevel": current_level,
        }),
        _ => json!({ "error": denied.message() }),
    };

    (status, Json(body)).into_response()
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

fn extract_token_from_header(req: &Request, kind: PrincipalKind) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, missing_token_message(kind)))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid Authorization header"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(reject(
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format. Expected: Bearer <token>",
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::middleware;
    use axum::routing::get;
    use axum::Extension;
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::principal::models::AdminIdentity;
    use crate::domain::principal::models::AdminRole;
    use crate::domain::principal::models::UserIdentity;
    use crate::domain::principal::models::UserRole;

    fn admin(role: AdminRole) -> Principal {
        Principal::Admin(AdminIdentity {
            id: AccountId::new(),
            email: "admin@example.com".to_string(),
            role,
        })
    }

    fn gated(rule: AccessRule, principal: Option<Principal>) -> Router {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(rule, authorize));

        match principal {
            Some(principal) => router.route_layer(Extension(principal)),
            None => router,
        }
    }

    async fn call(router: Router, uri: &str) -> (StatusCode, Option<Value>) {
        let response = router
            .oneshot(http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthorized() {
        let (status, body) = call(gated(AccessRule::AdminPanel, None), "/").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.unwrap()["error"], "Admin authentication required");
    }

    #[tokio::test]
    async fn test_level_denial_reports_levels() {
        let router = gated(AccessRule::MinimumLevel(4), Some(admin(AdminRole::Editor)));
        let (status, body) = call(router, "/").await;
        let body = body.unwrap();

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["currentRole"], "editor");
        assert_eq!(body["currentLevel"], 3);
        assert_eq!(body["requiredLevel"], 4);
    }

    #[tokio::test]
    async fn test_sufficient_level_reaches_handler() {
        let router = gated(
            AccessRule::MinimumLevel(4),
            Some(admin(AdminRole::ContentManager)),
        );
        let (status, _) = call(router, "/").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_role_allow_list() {
        let rule = AccessRule::admin_roles(&[AdminRole::SuperAdmin, AdminRole::ContentManager]);
        let router = gated(rule, Some(admin(AdminRole::Editor)));
        let (status, body) = call(router, "/").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.unwrap()["error"], "Insufficient admin permissions");
    }

    #[tokio::test]
    async fn test_ownership() {
        let principal = Principal::User(UserIdentity {
            id: AccountId::new(),
            email: "user@example.com".to_string(),
            role: UserRole::default(),
        });
        let own_id = principal.id().to_string();
        let router = Router::new()
            .route("/:id", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_ownership))
            .route_layer(Extension(principal));

        let (status, _) = call(router.clone(), &format!("/{}", own_id)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(router.clone(), &format!("/{}", AccountId::new())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body.unwrap()["error"],
            "Access denied: You can only access your own data"
        );

        let (status, _) = call(router, "/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
