use crate::genai::{ApiSettings, EnvConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;
use std::time::Duration;

pub const COMMAND_TEST_CONNECTION: &str = "test-connection";

#[must_use]
pub fn command() -> Command {
    Command::new(COMMAND_TEST_CONNECTION)
        .about("Send one generation request with the resolved API key and base URL")
        .arg(
            Arg::new("use-custom-api-config")
                .long("use-custom-api-config")
                .help("Use the stored key and proxy settings instead of the environment")
                .env("GATEKEEPER_USE_CUSTOM_API_CONFIG")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("use-api-proxy")
                .long("use-api-proxy")
                .help("Send requests through --api-proxy-url (custom config only)")
                .env("GATEKEEPER_USE_API_PROXY")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .help("Stored API key (custom config only)")
                .env("GATEKEEPER_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("api-proxy-url")
                .long("api-proxy-url")
                .help("Stored API proxy URL (custom config only)")
                .env("GATEKEEPER_API_PROXY_URL"),
        )
        .arg(
            Arg::new("gemini-api-key")
                .long("gemini-api-key")
                .help("Environment API key")
                .env("GEMINI_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("gemini-api-base-url")
                .long("gemini-api-base-url")
                .help("Environment API base URL")
                .env("GEMINI_API_BASE_URL"),
        )
        .arg(
            Arg::new("timeout-seconds")
                .long("timeout-seconds")
                .help("Request timeout in seconds")
                .env("GATEKEEPER_TEST_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub settings: ApiSettings,
    pub env: EnvConfig,
    pub timeout: Duration,
}

fn secret(matches: &ArgMatches, id: &str) -> Option<SecretString> {
    matches
        .get_one::<String>(id)
        .map(|value| SecretString::from(value.clone()))
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            settings: ApiSettings {
                use_custom_api_config: matches.get_flag("use-custom-api-config"),
                use_api_proxy: matches.get_flag("use-api-proxy"),
                api_key: secret(matches, "api-key"),
                api_proxy_url: matches.get_one::<String>("api-proxy-url").cloned(),
            },
            env: EnvConfig {
                api_key: secret(matches, "gemini-api-key"),
                base_url: matches.get_one::<String>("gemini-api-base-url").cloned(),
            },
            timeout: Duration::from_secs(
                matches
                    .get_one::<u64>("timeout-seconds")
                    .copied()
                    .unwrap_or(10),
            ),
        }
    }
}
