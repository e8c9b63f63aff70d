//! services/api/src/web/cookies.rs
//!
//! Builders for the `state` and `jwt` cookies. Both are `HttpOnly; Secure;
//! SameSite=Strict; Path=/`.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, SameSite};
use repo_bulletin_core::handshake::{STATE_COOKIE, STATE_MAX_AGE_SECS};
use repo_bulletin_core::session::{SESSION_COOKIE, SESSION_MAX_AGE_SECS};
use time::{Duration, OffsetDateTime};

fn strict(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

/// Cookie binding a handshake to this browser.
pub fn state_cookie(state: &str) -> Cookie<'static> {
    let mut cookie = strict(STATE_COOKIE, state.to_string());
    cookie.set_max_age(Duration::seconds(STATE_MAX_AGE_SECS));
    cookie
}

/// Expired state cookie, sent once the handshake is over.
pub fn clear_state_cookie() -> Cookie<'static> {
    expired(STATE_COOKIE)
}

/// Cookie carrying the session credential.
pub fn session_cookie(token: &str) -> Cookie<'static> {
    let mut cookie = strict(SESSION_COOKIE, token.to_string());
    cookie.set_max_age(Duration::seconds(SESSION_MAX_AGE_SECS));
    cookie
}

/// Expired session cookie, used by logout and account deletion.
pub fn clear_session_cookie() -> Cookie<'static> {
    expired(SESSION_COOKIE)
}

fn expired(name: &'static str) -> Cookie<'static> {
    let mut cookie = strict(name, String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie
}

/// All `Cookie` headers of a request joined into one `;`-separated string.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!values.is_empty()).then(|| values.join("; "))
}
