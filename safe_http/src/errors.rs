//! Error types for the client.

use std::error::Error as StdError;

use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::status::reason_phrase;

/// Longest body text kept in a [`RequestError`] message.
const MAX_MESSAGE_LEN: usize = 2000;

/// Errors that can occur when building or sending requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The server answered with one of the caught failure statuses.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// The server answered with an uncaught 4xx/5xx status.
    #[error(transparent)]
    Http(reqwest::Error),
    /// The request never produced a response (connection, timeout, middleware).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    /// Base URL and path did not form a valid URL.
    #[error("Invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client")]
    Build(#[source] reqwest::Error),
    #[error("Failed to read response body")]
    Body(#[source] reqwest::Error),
    #[error("Failed to encode request body")]
    Encode(#[source] serde_json::Error),
    /// A successful response did not deserialize into the requested type.
    #[error("Failed to parse response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns the normalized error if this is one.
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            Self::Request(e) => Some(e),
            _ => None,
        }
    }

    /// Status code of the failed response, for both caught and uncaught statuses.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request(e) => e.status(),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Body of a failed response: parsed JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorBody {
    /// Parses `text` as JSON, keeping it verbatim if it is not valid JSON.
    /// Empty text has no body.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(match serde_json::from_str(text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text.to_string()),
        })
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Normalized error produced for every caught failure status.
///
/// Carries the URL of the response, the method of the originating request,
/// the status code as text and the response body.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[error("{url}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct RequestError {
    pub url: String,
    /// Response body text, or the reason phrase when the body is empty.
    pub message: String,
    pub method: String,
    /// Status code as decimal text, e.g. `"404"`.
    pub response_code: String,
    /// Parsed JSON body, raw text if parsing failed, `None` for an empty body.
    pub json_response: Option<ErrorBody>,
}

impl RequestError {
    /// Builds the normalized error from the parts of a failed response.
    pub fn from_response(url: String, method: &Method, status: StatusCode, body: &str) -> Self {
        let message = if body.is_empty() {
            reason_phrase(status).to_string()
        } else {
            truncate_body(body)
        };
        Self {
            url,
            message,
            method: method.as_str().to_string(),
            response_code: status.as_u16().to_string(),
            json_response: ErrorBody::parse(body),
        }
    }

    /// Parses [`response_code`](Self::response_code) back into a status code.
    pub fn status(&self) -> Option<StatusCode> {
        self.response_code
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
    }

    /// Returns true if `err` or any error in its source chain is a `RequestError`.
    pub fn is_request_error(err: &(dyn StdError + 'static)) -> bool {
        Self::find(err).is_some()
    }

    /// Walks the source chain of `err` looking for a `RequestError`.
    pub fn find<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a RequestError> {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(request_error) = e.downcast_ref::<RequestError>() {
                return Some(request_error);
            }
            // Error::Request is transparent, so its source() skips the inner value
            if let Some(Error::Request(request_error)) = e.downcast_ref::<Error>() {
                return Some(request_error);
            }
            current = e.source();
        }
        None
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_MESSAGE_LEN {
        return body.to_string();
    }
    let mut end = MAX_MESSAGE_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(thiserror::Error, Debug)]
    #[error("lookup failed")]
    struct Wrapper(#[source] Error);

    fn not_found() -> RequestError {
        RequestError::from_response(
            "https://api.example.com/users/7".to_string(),
            &Method::GET,
            StatusCode::NOT_FOUND,
            r#"{"error":"no such user"}"#,
        )
    }

    #[test]
    fn json_body_is_parsed() {
        let err = not_found();
        assert_eq!(err.response_code, "404");
        assert_eq!(err.method, "GET");
        assert_eq!(
            err.json_response,
            Some(ErrorBody::Json(json!({"error": "no such user"})))
        );
    }

    #[test]
    fn text_body_is_kept() {
        let err = RequestError::from_response(
            "https://api.example.com".to_string(),
            &Method::POST,
            StatusCode::INTERNAL_SERVER_ERROR,
            "upstream exploded",
        );
        assert_eq!(err.message, "upstream exploded");
        assert_eq!(
            err.json_response.as_ref().and_then(|b| b.as_text()),
            Some("upstream exploded")
        );
    }

    #[test]
    fn empty_body_uses_reason_phrase() {
        let err = RequestError::from_response(
            "https://api.example.com".to_string(),
            &Method::DELETE,
            StatusCode::CONFLICT,
            "",
        );
        assert_eq!(err.message, "Conflict");
        assert_eq!(err.json_response, None);
        assert_eq!(err.to_string(), "https://api.example.com: Conflict");
    }

    #[test]
    fn whitespace_body_is_kept_as_message() {
        let err = RequestError::from_response(
            "https://api.example.com".to_string(),
            &Method::GET,
            StatusCode::BAD_REQUEST,
            "   ",
        );
        assert_eq!(err.message, "   ");
        assert_eq!(err.json_response, Some(ErrorBody::Text("   ".to_string())));
    }

    #[test]
    fn long_body_is_truncated_in_message_only() {
        let body = "x".repeat(MAX_MESSAGE_LEN + 10);
        let err = RequestError::from_response(
            "https://api.example.com".to_string(),
            &Method::GET,
            StatusCode::BAD_REQUEST,
            &body,
        );
        assert!(err.message.ends_with("...[truncated]"));
        assert_eq!(err.message.len(), MAX_MESSAGE_LEN + "...[truncated]".len());
        assert_eq!(err.json_response, Some(ErrorBody::Text(body)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(MAX_MESSAGE_LEN);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("...[truncated]"));
    }

    #[test]
    fn status_round_trips() {
        assert_eq!(not_found().status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(Error::from(not_found()).status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn is_request_error_walks_the_chain() {
        let direct = not_found();
        assert!(RequestError::is_request_error(&direct));

        let wrapped = Error::from(not_found());
        assert!(RequestError::is_request_error(&wrapped));

        let nested = Wrapper(Error::from(not_found()));
        assert_eq!(RequestError::find(&nested), Some(&not_found()));

        let other = Error::InvalidHeader("bad".to_string());
        assert!(!RequestError::is_request_error(&other));
    }

    #[test]
    fn serializes_in_camel_case() {
        insta::assert_json_snapshot!(not_found(), @r###"
        {
          "url": "https://api.example.com/users/7",
          "message": "{\"error\":\"no such user\"}",
          "method": "GET",
          "responseCode": "404",
          "jsonResponse": {
            "error": "no such user"
          }
        }
        "###);
    }
}
