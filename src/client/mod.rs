//! REST client contract
//!
//! The resource layer never talks HTTP directly. It speaks to anything that
//! implements [`RestClient`]: perform a verb against a path and turn the raw
//! response into a parsed body (or a normalized error).
//!
//! # Module Structure
//!
//! - [`http`] - reqwest-backed implementation used by the CLI
//!
//! # Example
//!
//! ```ignore
//! use cloudres::client::{HttpClient, RestClient, RequestOptions};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = HttpClient::new("https://oneview.example.com", 800)?;
//!     let response = client.rest_get("/rest/ethernet-networks", RequestOptions::default()).await?;
//!     let body = client.response_handler(response)?;
//!     Ok(())
//! }
//! ```

pub mod http;

pub use http::{format_api_error, HttpClient};

use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;

/// Request headers, ordered so merged header sets are deterministic
pub type Headers = BTreeMap<String, String>;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Per-request configuration: optional JSON body plus extra headers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub body: Option<Value>,
    pub headers: Headers,
}

impl RequestOptions {
    pub fn with_headers(headers: Headers) -> Self {
        Self {
            body: None,
            headers,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Unparsed HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pull a human-readable message out of an error body.
/// Understands `{"message": ..}` and `{"error": {"message": ..}}` shapes.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error").and_then(|e| e.get("message")))
        })
        .and_then(|m| m.as_str())
        .map(sanitize_for_log)
        .unwrap_or_else(|| sanitize_for_log(body))
}

/// Capability contract every client handed to a resource must satisfy
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Base URL of the appliance this client talks to
    fn endpoint(&self) -> &str;

    /// Perform one HTTP verb against `path` (relative to the endpoint)
    async fn rest_api(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<RawResponse, ClientError>;

    /// Turn a raw response into a parsed body.
    /// Non-success responses become [`ClientError::Status`]; an empty body is `null`.
    fn response_handler(&self, response: RawResponse) -> Result<Value, ClientError> {
        if !response.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} - {}",
                response.status,
                sanitize_for_log(&response.body)
            );
            return Err(ClientError::Status {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    async fn rest_get(&self, path: &str, options: RequestOptions) -> Result<RawResponse, ClientError> {
        self.rest_api(Method::GET, path, options).await
    }

    async fn rest_post(&self, path: &str, options: RequestOptions) -> Result<RawResponse, ClientError> {
        self.rest_api(Method::POST, path, options).await
    }

    async fn rest_patch(&self, path: &str, options: RequestOptions) -> Result<RawResponse, ClientError> {
        self.rest_api(Method::PATCH, path, options).await
    }

    async fn rest_delete(&self, path: &str, options: RequestOptions) -> Result<RawResponse, ClientError> {
        self.rest_api(Method::DELETE, path, options).await
    }
}
