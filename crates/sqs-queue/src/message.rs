//! Message contract and queue identifier.

use crate::error::ValidationError;
use std::str::FromStr;

// ============================================================================
// Message Contract
// ============================================================================

/// A value that can render itself as a queue payload
///
/// The adapter never looks inside a message; whatever `serialize` returns is
/// sent to the backend as the message body, byte for byte.
pub trait Message: Send + Sync {
    /// Render the transport payload
    fn serialize(&self) -> String;
}

impl Message for str {
    fn serialize(&self) -> String {
        self.to_string()
    }
}

impl Message for String {
    fn serialize(&self) -> String {
        self.clone()
    }
}

impl<T: Message + ?Sized> Message for &T {
    fn serialize(&self) -> String {
        (**self).serialize()
    }
}

/// Message holding the JSON rendering of a serializable value
///
/// Serialization happens once, at construction, so the payload is always
/// available afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonMessage {
    body: String,
}

impl JsonMessage {
    /// Render `value` as JSON
    pub fn new<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            body: serde_json::to_string(value)?,
        })
    }

    /// Get rendered JSON
    pub fn as_str(&self) -> &str {
        &self.body
    }
}

impl Message for JsonMessage {
    fn serialize(&self) -> String {
        self.body.clone()
    }
}

// ============================================================================
// Queue Identifier
// ============================================================================

/// Immutable identifier of the queue an adapter targets
///
/// With SQS this is normally the full queue URL. A bare queue name is accepted
/// as well, for backends that address queues by name; resolving a name to a
/// URL is up to the caller (see `HttpSqsBackend::resolve_queue_url`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueIdentifier(String);

impl QueueIdentifier {
    /// Create new queue identifier with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "queue".to_string(),
            });
        }

        if value.trim() != value {
            return Err(ValidationError::InvalidFormat {
                field: "queue".to_string(),
                message: "leading or trailing whitespace not allowed".to_string(),
            });
        }

        Ok(Self(value))
    }

    /// Get identifier as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the identifier is already an endpoint URL
    pub fn is_url(&self) -> bool {
        self.0.starts_with("https://") || self.0.starts_with("http://")
    }
}

impl std::fmt::Display for QueueIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueIdentifier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for QueueIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
