use crate::{
    api,
    gate::{GateConfig, Gatekeeper},
};
use anyhow::Result;
use std::{fmt::Write, sync::Arc};
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub upstream: Url,
    pub gate: GateConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the upstream is unusable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if !args.gate.is_enabled() {
        warn!("No password configured, every request is forwarded without authentication");
    }

    if args.gate.allow_list().static_assets() {
        warn!("Every path with a file extension is served without authentication");
    }

    let upstream = api::Upstream::new(args.upstream)?;
    let gate = Arc::new(Gatekeeper::new(args.gate));

    api::new(args.port, gate, upstream).await
}

fn startup_entries(args: &Args) -> Vec<(&'static str, String)> {
    vec![
        ("listen", format!("tcp:{}", args.port)),
        ("upstream", redact_url(&args.upstream)),
        ("gate_enabled", args.gate.is_enabled().to_string()),
        ("login_path", args.gate.login_path().to_string()),
        ("login_page", args.gate.login_page().to_string()),
        ("public_paths", args.gate.allow_list().paths().join(",")),
        (
            "public_static_assets",
            args.gate.allow_list().static_assets().to_string(),
        ),
    ]
}

fn redact_url(url: &Url) -> String {
    let mut url = url.clone();
    if url.password().is_some() {
        let _ = url.set_password(Some("REDACTED"));
    }
    url.to_string()
}

fn log_startup_args(args: &Args) {
    let entries = startup_entries(args);
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = String::from("Startup configuration:");
    for (key, value) in &entries {
        if write!(message, "\n  {key:<max_key_len$}  {value}").is_err() {
            break;
        }
    }
    info!("{message}");
}
