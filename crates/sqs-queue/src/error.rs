//! Error types for queue operations.

use thiserror::Error;

/// Backend request an adapter operation maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SendMessage,
    GetQueueAttributes,
    PurgeQueue,
}

impl Operation {
    /// Backend action name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMessage => "SendMessage",
            Self::GetQueueAttributes => "GetQueueAttributes",
            Self::PurgeQueue => "PurgeQueue",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the queue adapter
///
/// The adapter performs no recovery of its own. A failed backend request is
/// wrapped once, with the operation and queue it targeted, and the backend's
/// diagnostic detail is kept as the error source.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("{operation} request for queue '{queue}' failed: {source}")]
    BackendRequestFailed {
        operation: Operation,
        queue: String,
        #[source]
        source: BackendError,
    },

    #[error("Attribute '{attribute}' missing from response for queue '{queue}'")]
    AttributeMissing { attribute: String, queue: String },

    #[error("Attribute '{attribute}' for queue '{queue}' has invalid value '{value}'")]
    InvalidAttributeValue {
        attribute: String,
        queue: String,
        value: String,
    },
}

impl QueueError {
    /// Backend error behind a failed request, if any
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::BackendRequestFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors reported by a backend client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Request throttled: {0}")]
    Throttled(String),

    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    #[error("Request rejected: {code} - {message}")]
    Rejected { code: String, message: String },

    #[error("Service error: {0}")]
    Service(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl BackendError {
    /// Check if error is transient
    ///
    /// Only a classification for callers; nothing in this crate retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Authentication(_) => false,
            Self::Throttled(_) => true,
            Self::QueueNotFound(_) => false,
            Self::Rejected { .. } => false,
            Self::Service(_) => true,
            Self::MalformedResponse(_) => false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
