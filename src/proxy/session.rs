//! Session cookie issuance
//!
//! The cookie is the whole session: its value is the credential itself and
//! nothing is stored server-side.

use axum_extra::extract::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Seven days
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Cookie set after a successful login
pub fn issue_session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(SESSION_MAX_AGE_SECS))
        .build()
}

/// Cookie that makes the browser drop the session
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
