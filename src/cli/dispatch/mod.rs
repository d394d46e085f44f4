//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::{server, test_connection, Action};
use crate::cli::commands::{gate, genai, ARG_PORT, ARG_UPSTREAM};
use anyhow::{Context, Result};
use url::Url;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some((genai::COMMAND_TEST_CONNECTION, sub_m)) = matches.subcommand() {
        let options = genai::Options::parse(sub_m);
        return Ok(Action::TestConnection(test_connection::Args {
            settings: options.settings,
            env: options.env,
            timeout: options.timeout,
        }));
    }

    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let upstream = matches
        .get_one::<String>(ARG_UPSTREAM)
        .context("missing required argument: --upstream")?;
    let upstream = Url::parse(upstream).context("invalid GATEKEEPER_UPSTREAM")?;

    Ok(Action::Server(server::Args {
        port,
        upstream,
        gate: gate::Options::parse(matches).into_config(),
    }))
}
