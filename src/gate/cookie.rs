//! `auth` cookie extraction and `Set-Cookie` construction.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use super::token::SessionToken;

pub const SESSION_COOKIE_NAME: &str = "auth";

/// One year, in seconds.
pub const SESSION_COOKIE_MAX_AGE: u64 = 31_536_000;

/// Build the `Set-Cookie` value carrying the session token.
pub fn session_cookie(token: &SessionToken) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={SESSION_COOKIE_MAX_AGE}",
        token.as_str()
    ))
}

/// Return the raw value of the first cookie named `name` across all `Cookie`
/// headers. Names are matched exactly; `xauth=` does not match `auth`.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

/// Extract the session token presented by the client.
///
/// A malformed value is indistinguishable from a missing cookie.
pub fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    cookie_value(headers, SESSION_COOKIE_NAME).and_then(SessionToken::parse)
}
