use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use safe_http::{create_safe_client, ClientOptions, Error, Method, QueryParams, RetryOptions};

use crate::output::{print_request_error, print_response, OutputFormat, ResponseOutput};

#[derive(Args)]
pub struct RequestArgs {
    /// Target URL
    pub url: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q')]
    pub queries: Vec<String>,

    /// Header as "Name: value" (repeatable)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Send the body as JSON (validated before sending)
    #[arg(long)]
    pub json: bool,

    /// Retry transient failures up to N times (delays from SAFE_HTTP_RETRY_* variables)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Request timeout in seconds (defaults to SAFE_HTTP_TIMEOUT_SECS or 30)
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(
    method: Method,
    args: &RequestArgs,
    format: &OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let mut options = ClientOptions::from_env();
    if let Some(secs) = args.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    let mut client = create_safe_client(&args.url, options)?;
    if let Some(retries) = args.retries {
        client = client.with_retry(RetryOptions::from_env().with_max_retries(retries));
    }

    let mut request = client.request(method, "").query(&parse_queries(&args.queries)?);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        request = request.header(name, value);
    }
    if let Some(data) = &args.data {
        if args.json {
            let value: serde_json::Value =
                serde_json::from_str(data).context("--data is not valid JSON")?;
            request = request.json(&value);
        } else {
            request = request.body(data.clone());
        }
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(Error::Request(err)) => {
            print_request_error(out, &err, format)?;
            return Err(Error::Request(err).into());
        }
        Err(err) => return Err(err.into()),
    };

    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response.text().await.context("Failed to read response body")?;
    print_response(out, &ResponseOutput::new(status, url, &body), &body, format)
}

fn parse_queries(raw: &[String]) -> Result<QueryParams> {
    let mut params = QueryParams::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid query parameter '{}': expected key=value", pair);
        };
        if key.is_empty() {
            bail!("Invalid query parameter '{}': empty key", pair);
        }
        params = params.with(key, value);
    }
    Ok(params)
}

fn parse_header(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => bail!("Invalid header '{}': expected \"Name: value\"", raw),
    }
}
