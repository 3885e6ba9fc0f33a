//! Request outcome counters, recorded by a middleware on every attempt.

use std::sync::atomic::{AtomicU64, Ordering};

use http::Extensions;
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};

/// Atomic counters tracking request outcomes.
///
/// Sits below the retry middleware, so each retry counts as its own attempt.
#[derive(Debug, Default)]
pub struct RequestTracker {
    requests_made: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_rate_limited: AtomicU64,
    requests_failed: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_status(&self, status: StatusCode) {
        if status == StatusCode::TOO_MANY_REQUESTS {
            self.record_rate_limited();
        } else if status.is_client_error() || status.is_server_error() {
            self.record_failure();
        } else {
            self.record_success();
        }
    }

    /// Snapshot the current counters.
    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_rate_limited: self.requests_rate_limited.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

#[async_trait::async_trait]
impl Middleware for RequestTracker {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let result = next.run(req, extensions).await;
        match &result {
            Ok(response) => self.record_status(response.status()),
            Err(_) => self.record_failure(),
        }
        result
    }
}

/// Immutable snapshot of tracker counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSummary {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_rate_limited: u64,
    pub requests_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_counters() {
        let tracker = RequestTracker::new();

        tracker.record_success();
        tracker.record_success();
        tracker.record_rate_limited();
        tracker.record_failure();

        let summary = tracker.summary();
        assert_eq!(summary.requests_made, 4);
        assert_eq!(summary.requests_succeeded, 2);
        assert_eq!(summary.requests_rate_limited, 1);
        assert_eq!(summary.requests_failed, 1);
    }

    #[test]
    fn statuses_are_classified() {
        let tracker = RequestTracker::new();

        tracker.record_status(StatusCode::OK);
        tracker.record_status(StatusCode::NOT_MODIFIED);
        tracker.record_status(StatusCode::TOO_MANY_REQUESTS);
        tracker.record_status(StatusCode::NOT_FOUND);
        tracker.record_status(StatusCode::BAD_GATEWAY);

        assert_eq!(
            tracker.summary(),
            TrackerSummary {
                requests_made: 5,
                requests_succeeded: 2,
                requests_rate_limited: 1,
                requests_failed: 2,
            }
        );
    }
}
