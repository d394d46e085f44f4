use crate::gate::{
    allow_list::DEFAULT_PUBLIC_PATHS, AllowList, GateConfig, DEFAULT_LOGIN_PAGE,
    DEFAULT_LOGIN_PATH,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_PASSWORD: &str = "password";
pub const ARG_PUBLIC_PATH: &str = "public-path";
pub const ARG_PUBLIC_STATIC_ASSETS: &str = "public-static-assets";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_LOGIN_PAGE: &str = "login-page";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("Shared password; when unset or empty the gate forwards every request")
                .env("PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_PUBLIC_PATH)
                .long(ARG_PUBLIC_PATH)
                .help("Path served without a session (repeatable or comma separated)")
                .env("GATEKEEPER_PUBLIC_PATHS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .default_values(DEFAULT_PUBLIC_PATHS),
        )
        .arg(
            Arg::new(ARG_PUBLIC_STATIC_ASSETS)
                .long(ARG_PUBLIC_STATIC_ASSETS)
                .help("Also serve every path with a file extension without a session")
                .env("GATEKEEPER_PUBLIC_STATIC_ASSETS")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Path accepting the login form POST")
                .env("GATEKEEPER_LOGIN_PATH")
                .default_value(DEFAULT_LOGIN_PATH),
        )
        .arg(
            Arg::new(ARG_LOGIN_PAGE)
                .long(ARG_LOGIN_PAGE)
                .help("Login page browsers are redirected to")
                .env("GATEKEEPER_LOGIN_PAGE")
                .default_value(DEFAULT_LOGIN_PAGE),
        )
}

#[derive(Debug)]
pub struct Options {
    pub password: Option<SecretString>,
    pub public_paths: Vec<String>,
    pub public_static_assets: bool,
    pub login_path: String,
    pub login_page: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            password: matches
                .get_one::<String>(ARG_PASSWORD)
                .map(|password| SecretString::from(password.clone())),
            public_paths: matches
                .get_many::<String>(ARG_PUBLIC_PATH)
                .map(|paths| {
                    paths
                        .map(|path| path.trim().to_string())
                        .filter(|path| !path.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            public_static_assets: matches.get_flag(ARG_PUBLIC_STATIC_ASSETS),
            login_path: matches
                .get_one::<String>(ARG_LOGIN_PATH)
                .cloned()
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            login_page: matches
                .get_one::<String>(ARG_LOGIN_PAGE)
                .cloned()
                .unwrap_or_else(|| DEFAULT_LOGIN_PAGE.to_string()),
        }
    }

    #[must_use]
    pub fn into_config(self) -> GateConfig {
        GateConfig::new(self.password)
            .with_allow_list(AllowList::new(self.public_paths, self.public_static_assets))
            .with_login_path(self.login_path)
            .with_login_page(self.login_page)
    }
}
