//! Pre-configured HTTP client that turns failure responses into one error shape.
//!
//! [`create_safe_client`] builds a client bound to a base URL. Responses with
//! one of the [`CAUGHT_STATUSES`] are normalized into a [`RequestError`];
//! [`with_retry`] layers an exponential backoff policy on top.

mod client;
mod errors;
mod options;
mod query;
mod retry;
pub mod status;
mod tracker;
pub use self::client::{create_safe_client, SafeClient, SafeRequest};
pub use self::errors::{Error, ErrorBody, RequestError};
pub use self::options::ClientOptions;
pub use self::query::{Query, QueryParams};
pub use self::retry::{with_retry, RetryOptions};
pub use self::status::CAUGHT_STATUSES;
pub use self::tracker::{RequestTracker, TrackerSummary};

pub use reqwest::{Method, StatusCode};
