//! Session cookie helpers.

use axum::http::{header, HeaderMap};

use crate::config::SecurityConfig;

pub const SESSION_COOKIE: &str = "token";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// `Set-Cookie` value carrying a freshly issued session token
pub fn create_session_cookie(token: &str, security: &SecurityConfig) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; Max-Age={}",
        SESSION_COOKIE,
        token,
        security.cookie_expire_days * SECONDS_PER_DAY
    );
    if security.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that overwrites the session with `none` for ten seconds
pub fn create_logout_cookie() -> String {
    format!("{}=none; Path=/; HttpOnly; Max-Age=10", SESSION_COOKIE)
}

/// Token from `Authorization: Bearer`, falling back to the session cookie.
/// The cookie value `none` written on logout does not count.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty() && *value != "none")
        .map(|(_, value)| value.to_string())
}
