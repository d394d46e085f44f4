//! Session token derivation and strict parsing.

use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a hex-encoded SHA-256 digest.
pub const TOKEN_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of the configured secret.
///
/// The token is a pure function of the secret, so repeated logins with the same
/// password always produce the same value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Derive the token for a secret.
    #[must_use]
    pub fn derive(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Accept only exactly 64 lowercase hex characters.
    ///
    /// Anything else yields `None` and is treated by callers as a missing token.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let valid = value.len() == TOKEN_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are bearer credentials; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
