//! Pre-configured client and request builder.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    options::parse_header, ClientOptions, Error, Query, RequestError, RequestTracker,
    RetryOptions, CAUGHT_STATUSES,
};

/// Builds a client bound to `url` that normalizes the [`CAUGHT_STATUSES`]
/// into [`RequestError`].
pub fn create_safe_client(url: &str, options: ClientOptions) -> Result<SafeClient, Error> {
    SafeClient::new(url, options)
}

/// HTTP client bound to a base URL.
///
/// Cloning is cheap: clones share the connection pool and the tracker.
#[derive(Clone)]
pub struct SafeClient {
    /// Prefix for every request path.
    base_url: String,
    inner: reqwest::Client,
    http: ClientWithMiddleware,
    catchers: Vec<StatusCode>,
    retry: Option<RetryOptions>,
    tracker: Arc<RequestTracker>,
}

impl SafeClient {
    /// Creates a client with the default catchers and no retry policy.
    pub fn new(url: &str, options: ClientOptions) -> Result<Self, Error> {
        let inner = options.build_client()?;
        let tracker = Arc::new(RequestTracker::new());
        let http = build_middleware(&inner, None, &tracker);
        Ok(Self {
            base_url: url.to_string(),
            inner,
            http,
            catchers: CAUGHT_STATUSES.to_vec(),
            retry: None,
            tracker,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a client whose base URL has `path` appended.
    pub fn url(&self, path: &str) -> Self {
        let mut client = self.clone();
        client.base_url.push_str(path);
        client
    }

    /// Returns a client that also normalizes `status` into [`RequestError`].
    pub fn catcher(mut self, status: StatusCode) -> Self {
        if !self.catches(status) {
            self.catchers.push(status);
        }
        self
    }

    pub fn catches(&self, status: StatusCode) -> bool {
        self.catchers.contains(&status)
    }

    /// Attaches a retry policy, replacing any previous one.
    pub fn with_retry(mut self, options: RetryOptions) -> Self {
        self.http = build_middleware(&self.inner, Some(&options), &self.tracker);
        self.retry = Some(options);
        self
    }

    pub fn retry_options(&self) -> Option<&RetryOptions> {
        self.retry.as_ref()
    }

    /// Outcome counters shared by this client and its clones.
    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    /// Starts a request to the base URL followed by `path`.
    pub fn request(&self, method: Method, path: &str) -> SafeRequest {
        let raw = format!("{}{}", self.base_url, path);
        let url = Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl {
                url: raw,
                source: e,
            }
        });
        SafeRequest {
            client: self.clone(),
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(&self, path: &str) -> SafeRequest {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> SafeRequest {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> SafeRequest {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> SafeRequest {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> SafeRequest {
        self.request(Method::DELETE, path)
    }

    pub fn head(&self, path: &str) -> SafeRequest {
        self.request(Method::HEAD, path)
    }

    /// Maps a caught failure status to [`RequestError`]. Uncaught 4xx/5xx
    /// statuses surface as the `reqwest::Error` from `error_for_status`.
    async fn catch(&self, method: &Method, response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() || !self.catches(status) {
            return response.error_for_status().map_err(|e| {
                tracing::error!("Request failed with status {}: {}", status, e);
                Error::Http(e)
            });
        }

        let url = response.url().to_string();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Body(e)
        })?;
        let err = RequestError::from_response(url, method, status, &body);
        tracing::warn!("{} {} failed with status {}", err.method, err.url, status);
        Err(err.into())
    }
}

impl std::fmt::Debug for SafeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeClient")
            .field("base_url", &self.base_url)
            .field("catchers", &self.catchers)
            .field("retry", &self.retry)
            .finish()
    }
}

fn build_middleware(
    inner: &reqwest::Client,
    retry: Option<&RetryOptions>,
    tracker: &Arc<RequestTracker>,
) -> ClientWithMiddleware {
    let mut builder = ClientBuilder::new(inner.clone());
    if let Some(retry) = retry {
        builder = builder.with(RetryTransientMiddleware::new_with_policy(retry.policy()));
    }
    builder.with_arc(tracker.clone()).build()
}

/// A request being built against a [`SafeClient`].
///
/// URL, header and body errors are held until [`send`](Self::send).
pub struct SafeRequest {
    client: SafeClient,
    method: Method,
    url: Result<Url, Error>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl SafeRequest {
    /// Appends parameters to the existing query string.
    pub fn query(mut self, query: &impl Query) -> Self {
        self.url = self.url.map(|url| query.add_to_url(&url));
        self
    }

    /// Replaces the existing query string.
    pub fn replace_query(mut self, query: &impl Query) -> Self {
        self.url = self.url.map(|url| query.replace_in_url(&url));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        match parse_header(name, value) {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `body` as JSON and sets the content type.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.body = Some(bytes);
            }
            Err(e) => self.fail(Error::Encode(e)),
        }
        self
    }

    /// Overrides the client's timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL, or `None` if building it failed.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref().ok()
    }

    // Keeps the first error only.
    fn fail(&mut self, err: Error) {
        if self.url.is_ok() {
            self.url = Err(err);
        }
    }

    /// Sends the request and returns the response if its status is not caught.
    pub async fn send(self) -> Result<Response, Error> {
        let url = self.url?;
        tracing::debug!("{} {}", self.method, url);

        let mut builder = self
            .client
            .http
            .request(self.method.clone(), url)
            .headers(self.headers);
        if let Some(body) = self.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request: {}", e);
            Error::Transport(e)
        })?;

        self.client.catch(&self.method, response).await
    }

    /// Sends the request and returns the response body as text.
    pub async fn fetch_text(self) -> Result<String, Error> {
        let response = self.send().await?;
        response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Body(e)
        })
    }

    /// Sends the request and deserializes the JSON response body.
    pub async fn fetch_json<T: DeserializeOwned>(self) -> Result<T, Error> {
        let response = self.send().await?;
        let url = response.url().to_string();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Body(e)
        })?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", url, e);
            Error::Decode { url, source: e }
        })
    }
}
