//! Response classification
//!
//! Turns raw HTTP responses into the `ApiError` taxonomy the worker acts on.

use std::time::Duration;

use emotify_core::{ApiError, ApiResult};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Longest error body kept in an `ApiError::Status`
const MAX_ERROR_BODY: usize = 512;

/// Pass successful responses through, classify everything else
pub(crate) async fn check(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let header_delay = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .and_then(seconds);

    // A body that cannot be read still tells us the status
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimited {
            retry_after: retry_after(&body).or(header_delay),
        });
    }

    Err(ApiError::from_status(status.as_u16(), truncate(body)))
}

/// Decode a JSON body
pub(crate) async fn json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map a reqwest failure (connect, read, timeout) to `ApiError::Transport`
pub(crate) fn transport(err: reqwest::Error) -> ApiError {
    ApiError::transport(err.to_string(), err.is_timeout())
}

/// Read the `retry_after` field (seconds, possibly fractional) of a 429 body
pub fn retry_after(body: &str) -> Option<Duration> {
    let value: Value = serde_json::from_str(body).ok()?;
    let raw = value.get("retry_after")?;
    let secs = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    seconds(secs)
}

fn seconds(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs >= 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
