use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use safe_http::RequestError;

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Successful response as printed in JSON mode.
#[derive(Serialize)]
pub struct ResponseOutput {
    pub status: u16,
    pub url: String,
    pub body: serde_json::Value,
}

impl ResponseOutput {
    pub fn new(status: u16, url: String, body: &str) -> Self {
        Self {
            status,
            url,
            body: body_value(body),
        }
    }
}

/// Parses `body` as JSON, falling back to a JSON string. Empty bodies become `null`.
pub fn body_value(body: &str) -> serde_json::Value {
    if body.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_string()))
}

pub fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn print_response(
    out: &mut impl Write,
    response: &ResponseOutput,
    raw_body: &str,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if !raw_body.is_empty() {
                writeln!(out, "{}", raw_body)?;
            }
            Ok(())
        }
        OutputFormat::Json => print_json(out, response),
    }
}

/// Prints the normalized error in JSON mode. Text mode leaves reporting to the caller.
pub fn print_request_error(
    out: &mut impl Write,
    err: &RequestError,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => Ok(()),
        OutputFormat::Json => print_json(out, err),
    }
}
