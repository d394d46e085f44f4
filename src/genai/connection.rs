//! One-shot connectivity check against the generative AI API.

use super::ResolvedApi;
use crate::APP_USER_AGENT;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

pub const TEST_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

/// `v1`, `v1beta`, `v2`, ...
fn is_version_segment(segment: &str) -> bool {
    let version = segment.strip_suffix("beta").unwrap_or(segment);
    version
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Strip trailing slashes and a trailing `/v1`, `/v1beta`, ... segment.
fn api_root(base_url: &str) -> &str {
    let trimmed = base_url.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((root, last)) if !root.ends_with('/') && is_version_segment(last) => root,
        _ => trimmed,
    }
}

/// URL of the generation endpoint used by the connection test.
#[must_use]
pub fn generate_url(base_url: &str) -> String {
    format!(
        "{}/v1beta/models/{TEST_MODEL}:generateContent",
        api_root(base_url)
    )
}

/// Issue one lightweight generation request.
///
/// # Errors
/// Returns an error if the request cannot be sent or the API answers with a
/// non-success status.
#[instrument(skip(api), fields(endpoint = api.endpoint()))]
pub async fn test_connection(api: &ResolvedApi, timeout: Duration) -> Result<(), ConnectionError> {
    let client = Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()?;

    let url = generate_url(api.endpoint());
    debug!("Testing connection: {url}");

    let response = client
        .post(&url)
        .header("x-goog-api-key", api.api_key().expose_secret())
        .json(&json!({
            "contents": [{ "parts": [{ "text": "Hello" }] }]
        }))
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(ToString::to_string))
        .unwrap_or(body);

    Err(ConnectionError::Status { status, message })
}
