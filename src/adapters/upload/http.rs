//! Shared HTTP plumbing for the uploaders
//!
//! Builds clients with a bounded timeout and maps transport failures and
//! status codes onto the upload error classes.

use crate::domain::{LiftError, Result};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::time::Duration;

/// Upper bound for establishing a connection
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Builds an HTTP client whose requests give up after `timeout_seconds`
pub(crate) fn build_client(timeout_seconds: u64) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_seconds)))
        .user_agent(concat!("assetlift/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LiftError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Maps a transport-level failure (no response at all)
pub(crate) fn send_error(context: &str, err: reqwest::Error) -> LiftError {
    if err.is_timeout() {
        LiftError::Network(format!("{context}: request timed out"))
    } else if err.is_connect() {
        LiftError::Network(format!("{context}: cannot connect ({err})"))
    } else {
        LiftError::Network(format!("{context}: {err}"))
    }
}

/// Maps a non-success status code to an error class
pub(crate) fn status_error(context: &str, status: StatusCode, detail: &str) -> LiftError {
    let message = if detail.is_empty() {
        format!("{context}: HTTP {status}")
    } else {
        format!("{context}: HTTP {status}: {detail}")
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LiftError::Auth(message),
        StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INSUFFICIENT_STORAGE => LiftError::Quota(message),
        s if s.is_server_error() => LiftError::Network(message),
        _ => LiftError::protocol(message),
    }
}

/// Consumes a failed response and turns it into an error
///
/// Backends report details as `{"error": "..."}` or
/// `{"error": {"message": "..."}}`; either is preferred over the raw body.
pub(crate) async fn response_error(context: &str, response: Response) -> LiftError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    status_error(context, status, &error_detail(&body))
}

fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &value["error"];
        if let Some(msg) = error.as_str() {
            return msg.to_string();
        }
        if let Some(msg) = error["message"].as_str() {
            return msg.to_string();
        }
    }
    let trimmed = body.trim();
    // Keep HTML error pages out of user-facing messages
    if trimmed.starts_with('<') {
        return String::new();
    }
    trimmed.chars().take(200).collect()
}
