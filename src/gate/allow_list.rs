//! Paths exempt from authentication.

/// Paths served without a session cookie when no list is configured.
pub const DEFAULT_PUBLIC_PATHS: [&str; 4] = [
    "/login.html",
    "/favicon.ico",
    "/robots.txt",
    "/manifest.json",
];

/// Explicit allow-list consulted before the cookie check.
///
/// `static_assets` widens the list to every path whose last segment carries a
/// file extension. That also exempts routes such as `/api/data.json`, so it is
/// off unless the deployer turns it on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    paths: Vec<String>,
    static_assets: bool,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS.iter().map(ToString::to_string), false)
    }
}

impl AllowList {
    pub fn new<I>(paths: I, static_assets: bool) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            paths: paths.into_iter().collect(),
            static_assets,
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[must_use]
    pub const fn static_assets(&self) -> bool {
        self.static_assets
    }

    /// Exact path match, or any extensioned path in static-asset mode.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.paths.iter().any(|public| public == path) || (self.static_assets && has_extension(path))
    }
}

/// True when the final path segment looks like `name.ext`.
///
/// Dotfiles (`/.env`) and trailing dots (`/file.`) do not count.
#[must_use]
pub fn has_extension(path: &str) -> bool {
    let segment = path.rsplit('/').next().unwrap_or_default();
    segment
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
}
