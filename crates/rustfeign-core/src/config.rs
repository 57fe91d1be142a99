//! Client configuration.
//!
//! Provides [`FeignConfig`], the defaults every built client starts from. Values
//! can be loaded from `RUSTFEIGN_*` environment variables.

use std::time::Duration;

use rustfeign_model::RequestOptions;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Client configuration.
///
/// # Examples
///
/// ```
/// use rustfeign_core::config::FeignConfig;
///
/// let config = FeignConfig::default();
/// assert_eq!(config.connect_timeout_ms, 10_000);
/// assert!(config.decode_slash);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct FeignConfig {
    /// Connection timeout in milliseconds.
    #[builder(default = 10_000)]
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds.
    #[builder(default = 60_000)]
    pub read_timeout_ms: u64,

    /// Whether the client follows redirects.
    #[builder(default = true)]
    pub follow_redirects: bool,

    /// Whether `/` in expanded path values stays unencoded for mapping-style methods.
    #[builder(default = true)]
    pub decode_slash: bool,

    /// Level request logging runs at (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Headers added to every request unless already present.
    #[builder(default)]
    pub default_headers: Vec<(String, String)>,
}

impl Default for FeignConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            read_timeout_ms: 60_000,
            follow_redirects: true,
            decode_slash: true,
            log_level: String::from("info"),
            default_headers: Vec::new(),
        }
    }
}

impl FeignConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `RUSTFEIGN_CONNECT_TIMEOUT_MS` | `10000` |
    /// | `RUSTFEIGN_READ_TIMEOUT_MS` | `60000` |
    /// | `RUSTFEIGN_FOLLOW_REDIRECTS` | `true` |
    /// | `RUSTFEIGN_DECODE_SLASH` | `true` |
    /// | `RUSTFEIGN_LOG_LEVEL` | `info` |
    /// | `RUSTFEIGN_DEFAULT_HEADERS` | empty, `Name:value,Name2:value` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("RUSTFEIGN_CONNECT_TIMEOUT_MS") {
            if let Ok(n) = v.parse::<u64>() {
                config.connect_timeout_ms = n;
            }
        }
        if let Ok(v) = std::env::var("RUSTFEIGN_READ_TIMEOUT_MS") {
            if let Ok(n) = v.parse::<u64>() {
                config.read_timeout_ms = n;
            }
        }
        if let Ok(v) = std::env::var("RUSTFEIGN_FOLLOW_REDIRECTS") {
            config.follow_redirects = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("RUSTFEIGN_DECODE_SLASH") {
            config.decode_slash = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("RUSTFEIGN_LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("RUSTFEIGN_DEFAULT_HEADERS") {
            config.default_headers = parse_headers(&v);
        }

        config
    }

    /// The parsed `log_level`, falling back to info when it is not a level name.
    #[must_use]
    pub fn request_log_level(&self) -> tracing::Level {
        self.log_level.trim().parse().unwrap_or(tracing::Level::INFO)
    }

    /// Transport options derived from this configuration.
    #[must_use]
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            follow_redirects: self.follow_redirects,
        }
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Parse `Name:value,Name2:value`; entries without a `:` are skipped.
fn parse_headers(value: &str) -> Vec<(String, String)> {
    value
        .split(',')
        .filter_map(|entry| entry.split_once(':'))
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
