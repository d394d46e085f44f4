//! Input cleanup for API keys and base URLs.

use tracing::warn;

/// Trim, drop trailing slashes and default to `https://` when no scheme is given.
///
/// Returns `None` for empty input.
#[must_use]
pub fn normalize_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

/// Replace typographic punctuation that creeps in when keys are pasted from
/// documents.
#[must_use]
pub fn sanitize_api_key(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();

    if sanitized != key {
        warn!("API key sanitized: typographic characters replaced");
    }

    sanitized
}

/// Split a key field holding several keys separated by commas or newlines.
#[must_use]
pub fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(ToString::to_string)
        .collect()
}
