//! # Gatekeeper (single-password edge gate)
//!
//! `gatekeeper` sits in front of a deployed web origin and admits requests only
//! when they carry a session cookie proving knowledge of one shared password.
//!
//! ## Login
//!
//! `POST /login` with a form-encoded `password` field. When it matches the
//! configured secret the response sets an `auth` cookie holding the lowercase
//! hex SHA-256 digest of the secret. The token is deterministic: the same
//! password always yields the same cookie, and nothing is stored server-side.
//!
//! ## Guard
//!
//! Every other request is checked against the allow-list first, then against the
//! cookie. Admitted requests are forwarded to the upstream origin untouched.
//! Rejections are content-negotiated: browsers asking for `text/html` are
//! redirected to the login page, everything else gets a plain-text `401`.
//!
//! ## Disabled gate
//!
//! When no password is configured the gate forwards everything. This is an
//! explicit deployment state, not an error.

pub mod api;
pub mod cli;
pub mod gate;
pub mod genai;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
