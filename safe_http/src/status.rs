//! Status codes the client normalizes into [`RequestError`](crate::RequestError).

use reqwest::StatusCode;

/// Failure statuses caught by every client built with
/// [`create_safe_client`](crate::create_safe_client).
pub const CAUGHT_STATUSES: [StatusCode; 9] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::REQUEST_TIMEOUT,
    StatusCode::GATEWAY_TIMEOUT,
    StatusCode::BAD_REQUEST,
    StatusCode::NOT_FOUND,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::CONFLICT,
];

/// Returns the canonical reason phrase for a status, e.g. `"Not Found"`.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}
