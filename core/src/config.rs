//! Client configuration.

use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Environment variable holding the service base URL.
pub const BASE_URL_ENV: &str = "POSTS_API_URL";

/// Environment variable holding an optional request timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "POSTS_API_TIMEOUT_MS";

/// Largest response body read before the transport gives up (1 GiB).
pub const DEFAULT_BODY_LIMIT: u64 = 1 << 30;

/// Where the service lives and how long a round-trip may take.
///
/// `timeout` is `None` unless set explicitly: requests wait for the server
/// for as long as the OS allows. `body_limit` caps how many bytes of a
/// response body are read; a larger body is a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub body_limit: u64,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `POSTS_API_URL` and `POSTS_API_TIMEOUT_MS`.
    ///
    /// An unparsable timeout is ignored with a warning rather than failing
    /// startup.
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = env::var(TIMEOUT_ENV).ok().and_then(|raw| parse_timeout_ms(&raw));
        Self {
            timeout,
            ..Self::new(&base_url)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn parse_timeout_ms(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "ignoring invalid {TIMEOUT_ENV}");
            None
        }
    }
}
