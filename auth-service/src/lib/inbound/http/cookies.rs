use auth::PrincipalKind;
use auth::RefreshLifetime;
use auth::TokenLifetimes;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

pub const USER_REFRESH_COOKIE: &str = "refreshToken";
pub const ADMIN_REFRESH_COOKIE: &str = "adminRefreshToken";

pub fn refresh_cookie_name(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::User => USER_REFRESH_COOKIE,
        PrincipalKind::Admin => ADMIN_REFRESH_COOKIE,
    }
}

/// How refresh cookies are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub standard_max_age: time::Duration,
    pub remember_me_max_age: time::Duration,
}

impl CookieSettings {
    /// Cookie lifetimes mirror the refresh token lifetimes.
    pub fn new(production: bool, lifetimes: &TokenLifetimes) -> Self {
        Self {
            secure: production,
            standard_max_age: time::Duration::seconds(lifetimes.refresh.num_seconds()),
            remember_me_max_age: time::Duration::seconds(lifetimes.remember_me.num_seconds()),
        }
    }

    pub fn refresh_cookie(
        &self,
        kind: PrincipalKind,
        token: String,
        lifetime: RefreshLifetime,
    ) -> Cookie<'static> {
        let max_age = match lifetime {
            RefreshLifetime::Standard => self.standard_max_age,
            RefreshLifetime::RememberMe => self.remember_me_max_age,
        };

        Cookie::build((refresh_cookie_name(kind), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }

    pub fn set_refresh(
        &self,
        jar: CookieJar,
        kind: PrincipalKind,
        token: String,
        lifetime: RefreshLifetime,
    ) -> CookieJar {
        jar.add(self.refresh_cookie(kind, token, lifetime))
    }

    pub fn clear_refresh(&self, jar: CookieJar, kind: PrincipalKind) -> CookieJar {
        jar.remove(Cookie::build(refresh_cookie_name(kind)).path("/"))
    }
}
