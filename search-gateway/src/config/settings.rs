//! Environment settings for the search gateway.

use std::env;
use std::time::Duration;

use tracing::warn;

use search_gateway_repository::{BasicCredentials, ConnectionConfig, RetryPolicy};

use crate::GatewayStartupError;

/// Default search cluster URL.
const DEFAULT_SEARCH_URL: &str = "http://localhost:9200";

/// Default index prepared at startup.
const DEFAULT_INDEX: &str = "articles";

/// Default per-request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default attempts per outbound request.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for the search cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("fail-fast") | Some("failfast") | Some("fail_fast") => Self::FailFast,
            Some("retry") | None => Self::Retry,
            Some(other) => {
                warn!(value = %other, "Invalid SEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub url: String,
    pub credentials: Option<BasicCredentials>,
    pub accept_invalid_certs: bool,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub index: String,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
}

impl GatewaySettings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_URL`: Search cluster URL (default: http://localhost:9200)
    /// - `SEARCH_USERNAME` / `SEARCH_PASSWORD`: Basic-auth credentials (default: none)
    /// - `SEARCH_ACCEPT_INVALID_CERTS`: Skip TLS certificate verification (default: false)
    /// - `SEARCH_REQUEST_TIMEOUT_SECS`: Per-request timeout in seconds (default: 30)
    /// - `SEARCH_MAX_ATTEMPTS`: Attempts per request, including the first (default: 3)
    /// - `SEARCH_INDEX`: Index prepared at startup (default: "articles")
    /// - `SEARCH_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `SEARCH_RETRY_INTERVAL_SECS`: Connection retry interval in seconds (default: 15)
    pub fn from_env() -> Result<Self, GatewayStartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through a variable lookup function.
    ///
    /// Unparseable numbers and flags fall back to their defaults with a
    /// warning. A username without a password (or the reverse) is an error, as
    /// is a zero attempt count or request timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayStartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = match (non_empty("SEARCH_USERNAME"), non_empty("SEARCH_PASSWORD")) {
            (Some(username), Some(password)) => Some(BasicCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(GatewayStartupError::config(
                    "SEARCH_USERNAME and SEARCH_PASSWORD must be set together",
                ))
            }
        };

        let max_attempts: u32 = parse_or(&lookup, "SEARCH_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(GatewayStartupError::config(
                "SEARCH_MAX_ATTEMPTS must be at least 1",
            ));
        }

        let request_timeout_secs: u64 = parse_or(
            &lookup,
            "SEARCH_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );
        if request_timeout_secs == 0 {
            return Err(GatewayStartupError::config(
                "SEARCH_REQUEST_TIMEOUT_SECS must be at least 1",
            ));
        }

        Ok(Self {
            url: non_empty("SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            credentials,
            accept_invalid_certs: parse_flag(&lookup, "SEARCH_ACCEPT_INVALID_CERTS"),
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_attempts,
            index: non_empty("SEARCH_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string()),
            connection_mode: ConnectionMode::parse(lookup("SEARCH_CONNECTION_MODE").as_deref()),
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "SEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )),
        })
    }

    /// Connection settings for the cluster provider.
    pub fn connection_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(self.url.clone())
            .with_request_timeout(self.request_timeout)
            .with_retry_policy(RetryPolicy::with_max_attempts(self.max_attempts));

        if let Some(credentials) = &self.credentials {
            config = config.with_credentials(credentials.username.clone(), credentials.password.clone());
        }
        if self.accept_invalid_certs {
            config = config.danger_accept_invalid_certs();
        }
        config
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = key, value = %raw, "Invalid numeric setting, using default");
            default
        }),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => false,
        Some("true") | Some("1") | Some("yes") => true,
        Some(other) => {
            warn!(variable = key, value = %other, "Invalid boolean setting, using false");
            false
        }
    }
}
