//! HTTP utilities for ARM REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_LOG_BODY_LENGTH)
            .last()
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A non-success response from the ARM API
#[derive(Debug, Error)]
#[error("API request failed: {status}{}: {message}", code_suffix(.code))]
pub struct ApiError {
    pub status: StatusCode,
    /// ARM error code, e.g. `MessagingEntityNotFound`
    pub code: Option<String>,
    pub message: String,
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

impl ApiError {
    /// Build from a status and the raw response body.
    ///
    /// ARM wraps failures as `{"error": {"code": "...", "message": "..."}}`;
    /// anything else falls back to the canonical status reason.
    fn from_response(status: StatusCode, body: &str) -> Self {
        let error = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").cloned());

        let code = error
            .as_ref()
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str())
            .map(|c| c.to_string());
        let message = error
            .as_ref()
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        Self {
            status,
            code,
            message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

/// Check whether an error came from a 404 response
pub fn response_was_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_not_found)
}

/// HTTP client wrapper for ARM API calls
#[derive(Clone, Debug)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sbrule/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request to an ARM API
    pub async fn get(&self, url: &str, api_version: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let request = self.client.get(url);
        self.send(request, api_version, token).await
    }

    /// Make a PUT request to an ARM API
    pub async fn put(&self, url: &str, api_version: &str, token: &str, body: &Value) -> Result<Value> {
        tracing::debug!("PUT {}", url);

        let request = self.client.put(url).json(body);
        self.send(request, api_version, token).await
    }

    /// Make a DELETE request to an ARM API
    pub async fn delete(&self, url: &str, api_version: &str, token: &str) -> Result<Value> {
        tracing::debug!("DELETE {}", url);

        let request = self.client.delete(url);
        self.send(request, api_version, token).await
    }

    async fn send(&self, request: RequestBuilder, api_version: &str, token: &str) -> Result<Value> {
        let response = request
            .query(&[("api-version", api_version)])
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only the sanitized body goes to the log
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_response(status, &body).into());
        }

        // DELETE and 204 responses carry no body
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}
