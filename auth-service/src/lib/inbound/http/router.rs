use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::MethodRouter;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::CookieSettings;
use super::handlers::login;
use super::handlers::password;
use super::handlers::profile;
use super::handlers::registration;
use super::handlers::roles;
use super::handlers::session;
use super::middleware::authenticate_admin;
use super::middleware::authenticate_user;
use super::middleware::authorize;
use super::middleware::optional_user;
use super::middleware::refresh_admin;
use super::middleware::refresh_user;
use super::middleware::require_ownership;
use crate::domain::access::AccessRule;
use crate::domain::access::Permission;
use crate::domain::principal::models::AdminRole;
use crate::domain::principal::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub tokens: Arc<TokenService>,
    pub cookies: CookieSettings,
}

pub fn create_router(
    auth_service: Arc<dyn AuthServicePort>,
    tokens: Arc<TokenService>,
    cookies: CookieSettings,
) -> Router {
    let state = AppState {
        auth_service,
        tokens,
        cookies,
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers stay out of the span: they carry bearer tokens and cookies.
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .nest("/api/auth", user_routes(&state))
        .nest("/api/admin/auth", admin_routes(&state))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/register", post(registration::register))
        .route("/verify-registration", post(registration::verify_registration))
        .route("/login", post(login::user_login))
        .route("/verify-login", post(login::verify_user_login))
        .route("/forgot-password", post(password::forgot_password))
        .route(
            "/verify-forgot-password-otp",
            post(password::verify_forgot_password_otp),
        )
        .route(
            "/reset-password-with-otp",
            post(password::reset_password_with_otp),
        )
        .route("/reset-password", post(password::reset_password));

    let optional_routes = Router::new()
        .route("/session", get(session::current_session))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_user));

    let refresh_routes = Router::new()
        .route("/refresh-token", post(session::refresh_token))
        .route_layer(middleware::from_fn_with_state(state.clone(), refresh_user));

    let owned_routes = Router::new()
        .route("/accounts/:id", get(profile::get_account))
        .route_layer(middleware::from_fn(require_ownership));

    // Layers run bottom-up: authentication first, then the route's own gate.
    let protected_routes = Router::new()
        .route("/logout", post(session::logout))
        .route("/profile", get(profile::get_profile))
        .merge(owned_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_user,
        ));

    Router::new()
        .merge(public_routes)
        .merge(optional_routes)
        .merge(refresh_routes)
        .merge(protected_routes)
}

fn gated(path: &str, handler: MethodRouter<AppState>, rule: AccessRule) -> Router<AppState> {
    Router::new()
        .route(path, handler)
        .route_layer(middleware::from_fn_with_state(rule, authorize))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/login", post(login::admin_login))
        .route("/verify-login", post(login::verify_admin_login));

    let refresh_routes = Router::new()
        .route("/refresh-token", post(session::refresh_token))
        .route_layer(middleware::from_fn_with_state(state.clone(), refresh_admin));

    let protected_routes = Router::new()
        .route("/logout", post(session::logout))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/change-password", put(password::change_password))
        .route("/role-level", get(roles::role_level))
        .route("/check-role/:role", get(roles::check_role))
        .route("/check-any-role", post(roles::check_any_role))
        .merge(gated(
            "/super-admin-only",
            get(roles::super_admin_only),
            AccessRule::Permission(Permission::SystemAdmin),
        ))
        .merge(gated(
            "/content-manager-plus",
            get(roles::content_manager_plus),
            AccessRule::Permission(Permission::ManageUsers),
        ))
        .merge(gated(
            "/editor-plus",
            get(roles::editor_plus),
            AccessRule::Permission(Permission::ManagePublications),
        ))
        .merge(gated(
            "/managers",
            get(roles::managers),
            AccessRule::admin_roles(&[AdminRole::SuperAdmin, AdminRole::ContentManager]),
        ))
        .merge(gated(
            "/senior-staff",
            get(roles::senior_staff),
            AccessRule::MinimumLevel(4),
        ))
        .route_layer(middleware::from_fn_with_state(
            AccessRule::AdminPanel,
            authorize,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(refresh_routes)
        .merge(protected_routes)
}
