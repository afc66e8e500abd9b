//! Error types
//!
//! Typed errors for the resource layer and the HTTP collaborator. The binary
//! wraps these in `anyhow` for context; the library surfaces them as-is.

use crate::resource::Operation;

/// Errors raised by a [`RestClient`](crate::client::RestClient).
///
/// The resource layer never inspects these, it only propagates them.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status code, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// Errors raised by [`Resource`](crate::resource::Resource) operations.
#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error("Invalid client: {0}")]
    InvalidClient(String),

    #[error("Incomplete resource: {0}")]
    IncompleteResource(String),

    #[error("Method '{operation}' is unavailable for resource type '{kind}'")]
    MethodUnavailable { kind: String, operation: Operation },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Can't compare with {0}: expected a key-value mapping")]
    NotComparable(&'static str),

    #[error("Unknown resource type: {0}")]
    UnknownKind(String),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<serde_yaml::Error> for ResourceError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Format(error.to_string())
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(error: serde_json::Error) -> Self {
        Self::Format(error.to_string())
    }
}

pub type Result<T, E = ResourceError> = std::result::Result<T, E>;
