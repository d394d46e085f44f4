//! Single-password gate.
//!
//! [`Gatekeeper`] owns the immutable gate configuration and turns a request into
//! an [`Outcome`]. The axum glue lives in [`middleware`].

pub mod allow_list;
pub mod cookie;
pub mod login;
pub mod middleware;
pub mod token;

pub use self::allow_list::AllowList;
pub use self::middleware::guard;
pub use self::token::SessionToken;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info};

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LOGIN_PAGE: &str = "/login.html";

pub const BODY_OK: &str = "OK";
pub const BODY_BAD_REQUEST: &str = "Bad Request";
pub const BODY_UNAUTHORIZED: &str = "Unauthorized";
pub const BODY_UNAUTHORIZED_ASSET: &str = "Unauthorized Access to Static Asset";

/// Gate settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct GateConfig {
    secret: Option<SecretString>,
    allow_list: AllowList,
    login_path: String,
    login_page: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            secret: None,
            allow_list: AllowList::default(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            login_page: DEFAULT_LOGIN_PAGE.to_string(),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn new(secret: Option<SecretString>) -> Self {
        Self::default().with_secret(secret)
    }

    /// An empty secret disables the gate, same as an unset one.
    #[must_use]
    pub fn with_secret(mut self, secret: Option<SecretString>) -> Self {
        self.secret = secret.filter(|secret| !secret.expose_secret().is_empty());
        self
    }

    #[must_use]
    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, login_path: String) -> Self {
        self.login_path = login_path;
        self
    }

    #[must_use]
    pub fn with_login_page(mut self, login_page: String) -> Self {
        self.login_page = login_page;
        self
    }

    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }
}

/// What the gate decided for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Hand the original request to the upstream untouched.
    Forward,
    /// Correct password: answer `200 OK` and set the session cookie.
    IssueAndAccept(SessionToken),
    /// `401` with a plain-text body.
    RejectUnauthorized(&'static str),
    /// `400`, login body could not be decoded.
    RejectBadRequest,
    /// `302` to the login page.
    RedirectToLogin,
}

#[derive(Debug)]
pub struct Gatekeeper {
    config: GateConfig,
    // Memoized per secret; the secret cannot change after construction.
    expected: Option<SessionToken>,
}

impl Gatekeeper {
    #[must_use]
    pub fn new(config: GateConfig) -> Self {
        let expected = config
            .secret
            .as_ref()
            .map(|secret| SessionToken::derive(secret.expose_secret()));
        Self { config, expected }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    #[must_use]
    pub fn is_login_submission(&self, method: &Method, path: &str) -> bool {
        method == Method::POST && path == self.config.login_path
    }

    /// Judge a login submission.
    ///
    /// `submitted` is the decoded `password` field, or `Err` when the body could
    /// not be decoded at all.
    pub fn login<E: std::fmt::Display>(&self, submitted: Result<Option<String>, E>) -> Outcome {
        let Some(secret) = &self.config.secret else {
            return Outcome::Forward;
        };

        let password = match submitted {
            Ok(password) => password,
            Err(err) => {
                debug!("Rejecting login submission: {err}");
                return Outcome::RejectBadRequest;
            }
        };

        match password {
            Some(password) if password == secret.expose_secret() => {
                info!("Login accepted");
                Outcome::IssueAndAccept(SessionToken::derive(&password))
            }
            _ => {
                info!("Login rejected: wrong password");
                Outcome::RejectUnauthorized(BODY_UNAUTHORIZED)
            }
        }
    }

    /// Judge any request that is not a login submission.
    pub fn authorize(&self, path: &str, headers: &HeaderMap) -> Outcome {
        if self.config.allow_list.is_public(path) {
            debug!("Public path, bypassing gate: {path}");
            return Outcome::Forward;
        }

        let Some(expected) = &self.expected else {
            return Outcome::Forward;
        };

        // TODO: switch to a constant-time comparison if the deployment
        // threat model ever includes timing attacks against the cookie.
        if cookie::session_token(headers).as_ref() == Some(expected) {
            return Outcome::Forward;
        }

        if accepts_html(headers) {
            debug!("Missing or invalid session, redirecting: {path}");
            Outcome::RedirectToLogin
        } else if allow_list::has_extension(path) {
            debug!("Missing or invalid session for asset: {path}");
            Outcome::RejectUnauthorized(BODY_UNAUTHORIZED_ASSET)
        } else {
            debug!("Missing or invalid session: {path}");
            Outcome::RejectUnauthorized(BODY_UNAUTHORIZED)
        }
    }

    /// Render a terminal outcome. `Forward` has no response of its own and is
    /// answered with `500` if it ever reaches here.
    #[must_use]
    pub fn respond(&self, outcome: Outcome) -> Response {
        match outcome {
            Outcome::IssueAndAccept(token) => match cookie::session_cookie(&token) {
                Ok(cookie) => (StatusCode::OK, [(SET_COOKIE, cookie)], BODY_OK).into_response(),
                Err(err) => {
                    error!("Failed to build session cookie: {err}");
                    (StatusCode::UNAUTHORIZED, BODY_UNAUTHORIZED).into_response()
                }
            },
            Outcome::RejectUnauthorized(body) => {
                (StatusCode::UNAUTHORIZED, plain_text(), body).into_response()
            }
            Outcome::RejectBadRequest => {
                (StatusCode::BAD_REQUEST, plain_text(), BODY_BAD_REQUEST).into_response()
            }
            Outcome::RedirectToLogin => match HeaderValue::from_str(&self.config.login_page) {
                Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
                Err(err) => {
                    error!("Invalid login page location: {err}");
                    (StatusCode::UNAUTHORIZED, BODY_UNAUTHORIZED).into_response()
                }
            },
            Outcome::Forward => {
                error!("Forward outcome cannot be rendered without an upstream");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("text/html"))
}

fn plain_text() -> [(axum::http::HeaderName, HeaderValue); 1] {
    [(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    )]
}
