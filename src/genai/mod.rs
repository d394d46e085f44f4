//! Generative AI client configuration.
//!
//! The gate never talks to the AI API itself. This module resolves which key and
//! base URL the deployment uses, and backs the `test-connection` command.
//!
//! Resolution keeps the two sources strictly apart:
//!
//! - **Custom config on:** only the stored settings apply. The proxy URL is used
//!   when the proxy toggle is on and a URL is present, otherwise the default
//!   endpoint. Environment values are ignored even when the stored key is empty.
//! - **Custom config off:** only `GEMINI_API_KEY` / `GEMINI_API_BASE_URL` apply.

pub mod connection;
pub mod normalize;

pub use self::connection::{test_connection, ConnectionError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Settings stored by the UI.
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    pub use_custom_api_config: bool,
    pub use_api_proxy: bool,
    pub api_key: Option<SecretString>,
    pub api_proxy_url: Option<String>,
}

/// Deployment environment fallbacks.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Custom,
    Environment,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Please enter an API Key.")]
    MissingStoredKey,
    #[error("No API Key found in environment.")]
    MissingEnvKey,
    #[error("Invalid API Key format.")]
    InvalidKeyFormat,
}

/// Exactly one key and base URL.
#[derive(Debug, Clone)]
pub struct ResolvedApi {
    api_key: SecretString,
    base_url: Option<String>,
    source: ConfigSource,
}

impl ResolvedApi {
    #[must_use]
    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// Custom base URL, `None` when the default endpoint applies.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    #[must_use]
    pub const fn source(&self) -> ConfigSource {
        self.source
    }
}

/// Resolve the key and base URL for the AI client.
///
/// # Errors
/// Returns an error when the selected source has no key, or the key field holds
/// no usable key.
pub fn resolve(settings: &ApiSettings, env: &EnvConfig) -> Result<ResolvedApi, ResolveError> {
    let (raw_key, base_url, source) = if settings.use_custom_api_config {
        let base_url = if settings.use_api_proxy {
            settings
                .api_proxy_url
                .as_deref()
                .and_then(normalize::normalize_url)
        } else {
            None
        };
        if base_url.is_some() {
            debug!("Using custom proxy URL from settings");
        } else {
            debug!("Custom config on without proxy, using default endpoint");
        }
        let key = settings
            .api_key
            .as_ref()
            .ok_or(ResolveError::MissingStoredKey)?;
        (key, base_url, ConfigSource::Custom)
    } else {
        let base_url = env.base_url.as_deref().and_then(normalize::normalize_url);
        if base_url.is_some() {
            debug!("Using base URL from environment");
        } else {
            debug!("No base URL in environment, using default endpoint");
        }
        let key = env.api_key.as_ref().ok_or(ResolveError::MissingEnvKey)?;
        (key, base_url, ConfigSource::Environment)
    };

    if raw_key.expose_secret().trim().is_empty() {
        return Err(match source {
            ConfigSource::Custom => ResolveError::MissingStoredKey,
            ConfigSource::Environment => ResolveError::MissingEnvKey,
        });
    }

    let first = normalize::parse_api_keys(raw_key.expose_secret())
        .into_iter()
        .next()
        .ok_or(ResolveError::InvalidKeyFormat)?;

    Ok(ResolvedApi {
        api_key: SecretString::from(normalize::sanitize_api_key(&first)),
        base_url,
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(value: &str) -> Option<SecretString> {
        Some(SecretString::from(value.to_string()))
    }

    fn env() -> EnvConfig {
        EnvConfig {
            api_key: secret("env-key"),
            base_url: Some("env.example.com/".to_string()),
        }
    }

    #[test]
    fn custom_with_proxy_uses_stored_values_only() {
        let settings = ApiSettings {
            use_custom_api_config: true,
            use_api_proxy: true,
            api_key: secret("stored-key"),
            api_proxy_url: Some("https://proxy.example.com/".to_string()),
        };
        let resolved = resolve(&settings, &env()).unwrap();
        assert_eq!(resolved.api_key().expose_secret(), "stored-key");
        assert_eq!(resolved.base_url(), Some("https://proxy.example.com"));
        assert_eq!(resolved.source(), ConfigSource::Custom);
    }

    #[test]
    fn custom_without_proxy_uses_default_endpoint() {
        let settings = ApiSettings {
            use_custom_api_config: true,
            use_api_proxy: false,
            api_key: secret("stored-key"),
            api_proxy_url: Some("https://proxy.example.com".to_string()),
        };
        let resolved = resolve(&settings, &env()).unwrap();
        assert_eq!(resolved.base_url(), None);
        assert_eq!(resolved.endpoint(), DEFAULT_BASE_URL);
    }

    #[test]
    fn custom_proxy_toggle_with_empty_url_uses_default_endpoint() {
        let settings = ApiSettings {
            use_custom_api_config: true,
            use_api_proxy: true,
            api_key: secret("stored-key"),
            api_proxy_url: Some("  ".to_string()),
        };
        assert_eq!(resolve(&settings, &env()).unwrap().base_url(), None);
    }

    #[test]
    fn custom_never_falls_back_to_environment() {
        let settings = ApiSettings {
            use_custom_api_config: true,
            ..ApiSettings::default()
        };
        assert_eq!(
            resolve(&settings, &env()).unwrap_err(),
            ResolveError::MissingStoredKey
        );

        let blank = ApiSettings {
            use_custom_api_config: true,
            api_key: secret("   "),
            ..ApiSettings::default()
        };
        assert_eq!(
            resolve(&blank, &env()).unwrap_err(),
            ResolveError::MissingStoredKey
        );
    }

    #[test]
    fn environment_mode_ignores_stored_values() {
        let settings = ApiSettings {
            use_custom_api_config: false,
            use_api_proxy: true,
            api_key: secret("stored-key"),
            api_proxy_url: Some("https://proxy.example.com".to_string()),
        };
        let resolved = resolve(&settings, &env()).unwrap();
        assert_eq!(resolved.api_key().expose_secret(), "env-key");
        assert_eq!(resolved.base_url(), Some("https://env.example.com"));
        assert_eq!(resolved.source(), ConfigSource::Environment);
    }

    #[test]
    fn environment_mode_without_key_fails() {
        let env = EnvConfig {
            api_key: None,
            base_url: None,
        };
        assert_eq!(
            resolve(&ApiSettings::default(), &env).unwrap_err(),
            ResolveError::MissingEnvKey
        );
    }

    #[test]
    fn first_key_is_selected_and_sanitized() {
        let env = EnvConfig {
            api_key: secret("AIza\u{2013}one, AIza-two"),
            base_url: None,
        };
        let resolved = resolve(&ApiSettings::default(), &env).unwrap();
        assert_eq!(resolved.api_key().expose_secret(), "AIza-one");
    }

    #[test]
    fn key_field_of_separators_is_invalid() {
        let env = EnvConfig {
            api_key: secret(" ,\n,"),
            base_url: None,
        };
        assert_eq!(
            resolve(&ApiSettings::default(), &env).unwrap_err(),
            ResolveError::InvalidKeyFormat
        );
    }

    #[test]
    fn error_messages_match_ui_wording() {
        assert_eq!(ResolveError::MissingStoredKey.to_string(), "Please enter an API Key.");
        assert_eq!(
            ResolveError::MissingEnvKey.to_string(),
            "No API Key found in environment."
        );
    }
}
