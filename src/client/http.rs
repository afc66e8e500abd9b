//! HTTP client for cloud-management REST APIs

use super::{sanitize_for_log, RawResponse, RequestOptions, RestClient};
use crate::error::{ClientError, ResourceError};
use async_trait::async_trait;
use reqwest::{Client, Method};

/// Header carrying the negotiated API version
const API_VERSION_HEADER: &str = "X-API-Version";

/// Header carrying the session token
const AUTH_HEADER: &str = "Auth";

/// reqwest-backed [`RestClient`]
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    api_version: u32,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client for the given appliance endpoint
    pub fn new(endpoint: &str, api_version: u32) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("cloudres/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version,
            token: None,
        })
    }

    /// Attach a pre-issued session token, sent on every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Resolve a request path against the endpoint.
    /// Absolute URLs (e.g. a `nextPageUri` pointing elsewhere) pass through untouched.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl RestClient for HttpClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn rest_api(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<RawResponse, ClientError> {
        let url = self.url_for(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(API_VERSION_HEADER, self.api_version.to_string());

        if let Some(token) = &self.token {
            request = request.header(AUTH_HEADER, token);
        }

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::debug!("Non-success response from {}: {} - {}", url, status, sanitize_for_log(&body));
        }

        Ok(RawResponse { status, body })
    }
}

/// Format an API error for display
/// Security: Sanitizes error messages to avoid leaking sensitive API details
pub fn format_api_error(error: &anyhow::Error) -> String {
    let status = error.chain().find_map(|cause| {
        if let Some(client_error) = cause.downcast_ref::<ClientError>() {
            return client_error.status();
        }
        match cause.downcast_ref::<ResourceError>() {
            Some(ResourceError::Client(client_error)) => client_error.status(),
            _ => None,
        }
    });

    match status {
        Some(403) => return "Permission denied. Check your appliance user privileges.".to_string(),
        Some(401) => return "Authentication failed. Check your session token.".to_string(),
        Some(404) => return "Resource not found.".to_string(),
        Some(429) => return "Rate limit exceeded. Please try again later.".to_string(),
        Some(400) => return "Invalid request. Check your parameters.".to_string(),
        Some(409) => {
            return "Resource conflict. The resource may already exist or be in use.".to_string()
        }
        Some(500) | Some(503) => {
            return "Appliance temporarily unavailable. Please try again.".to_string()
        }
        Some(_) => {
            return "Request failed. Check your network connection and try again.".to_string()
        }
        None => {}
    }

    // Truncate long error messages and remove potential sensitive data
    let error_str = error.to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
