use crate::genai::{self, ApiSettings, ConfigSource, EnvConfig};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub settings: ApiSettings,
    pub env: EnvConfig,
    pub timeout: Duration,
}

/// Resolve the API configuration and send one test request.
/// # Errors
/// Returns an error if no key can be resolved or the API rejects the request.
pub async fn execute(args: Args) -> Result<()> {
    let api = genai::resolve(&args.settings, &args.env)?;

    let source = match api.source() {
        ConfigSource::Custom => "custom settings",
        ConfigSource::Environment => "environment",
    };
    info!("Testing {} using {source}", api.endpoint());

    genai::test_connection(&api, args.timeout)
        .await
        .with_context(|| format!("Connection test against {} failed", api.endpoint()))?;

    println!("Connection successful: {}", api.endpoint());

    Ok(())
}
