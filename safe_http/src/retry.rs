//! Retry policy layered on top of a [`SafeClient`].
//!
//! Retries are delegated to `reqwest-retry`: transient outcomes (connection
//! errors, timeouts, 5xx, 408 and 429) are retried with jittered exponential
//! backoff before the final response reaches status normalization.

use std::time::Duration;

use reqwest_retry::policies::ExponentialBackoff;

use crate::options::parse_or;
use crate::SafeClient;

/// Backoff settings for [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOptions {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub min_delay: Duration,
    /// Upper bound for a single backoff. Raised to `min_delay` if lower.
    pub max_delay: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(30000),
        }
    }
}

impl RetryOptions {
    /// Reads `SAFE_HTTP_RETRY_MAX`, `SAFE_HTTP_RETRY_BASE_MS` and `SAFE_HTTP_RETRY_MAX_MS`.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_retries: parse_or(&var, "SAFE_HTTP_RETRY_MAX", defaults.max_retries),
            min_delay: Duration::from_millis(parse_or(
                &var,
                "SAFE_HTTP_RETRY_BASE_MS",
                defaults.min_delay.as_millis() as u64,
            )),
            max_delay: Duration::from_millis(parse_or(
                &var,
                "SAFE_HTTP_RETRY_MAX_MS",
                defaults.max_delay.as_millis() as u64,
            )),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    pub(crate) fn policy(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .retry_bounds(self.min_delay, self.max_delay.max(self.min_delay))
            .build_with_max_retries(self.max_retries)
    }
}

/// Returns `client` with a retry policy attached, replacing any previous one.
pub fn with_retry(client: SafeClient, options: RetryOptions) -> SafeClient {
    client.with_retry(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let options = RetryOptions::default();
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.min_delay, Duration::from_secs(2));
        assert_eq!(options.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn reads_variables() {
        let vars: HashMap<&str, &str> = [
            ("SAFE_HTTP_RETRY_MAX", "5"),
            ("SAFE_HTTP_RETRY_BASE_MS", "100"),
            ("SAFE_HTTP_RETRY_MAX_MS", "bogus"),
        ]
        .into_iter()
        .collect();
        let options = RetryOptions::from_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(options.max_retries, 5);
        assert_eq!(options.min_delay, Duration::from_millis(100));
        assert_eq!(options.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn inverted_bounds_build_a_policy() {
        let options = RetryOptions::default()
            .with_max_retries(1)
            .with_delays(Duration::from_secs(5), Duration::from_secs(1));
        // retry_bounds panics when min > max
        let _ = options.policy();
    }
}
