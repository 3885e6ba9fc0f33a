//! Configuration for the underlying `reqwest::Client`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Options applied to every request sent by a client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Headers sent with every request.
    pub headers: HeaderMap,
    pub user_agent: String,
    /// Total time allowed per request. `None` disables the timeout.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            connect_timeout: None,
        }
    }
}

impl ClientOptions {
    /// Reads `SAFE_HTTP_TIMEOUT_SECS`, `SAFE_HTTP_CONNECT_TIMEOUT_SECS` and
    /// `SAFE_HTTP_USER_AGENT`, falling back to defaults for missing or
    /// unparseable values.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            headers: defaults.headers,
            user_agent: var("SAFE_HTTP_USER_AGENT")
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            timeout: Some(Duration::from_secs(parse_or(
                &var,
                "SAFE_HTTP_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            ))),
            connect_timeout: var("SAFE_HTTP_CONNECT_TIMEOUT_SECS")
                .and_then(|val| val.parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Removes the overall request timeout.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(self.headers.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::Build(e)
        })
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), Error> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::InvalidHeader(format!("invalid name {:?}", name)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| Error::InvalidHeader(format!("invalid value for {}", name)))?;
    Ok((header_name, header_value))
}

pub(crate) fn parse_or<T: std::str::FromStr>(
    var: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    var(key)
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}
