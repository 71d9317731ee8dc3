//! Backend client contract.
//!
//! The adapter talks to its backend through [`SqsBackend`], a narrow capability
//! set of three requests shaped after the SQS API. Any client able to send a
//! message, read queue attributes and purge a queue can stand behind it: the
//! HTTP client in [`crate::providers`], an SDK wrapper, or a test double.

use crate::error::BackendError;
use async_trait::async_trait;
use std::collections::HashMap;

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

/// Attribute holding the backend's estimate of pending messages
pub const APPROXIMATE_NUMBER_OF_MESSAGES: &str = "ApproximateNumberOfMessages";

// ============================================================================
// Requests and Responses
// ============================================================================

/// Request to enqueue one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub queue_url: String,
    pub message_body: String,
}

impl SendMessageRequest {
    pub fn new(queue_url: impl Into<String>, message_body: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            message_body: message_body.into(),
        }
    }
}

/// Acknowledgement of a sent message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageOutput {
    /// Identifier assigned by the backend, when it reports one
    pub message_id: Option<String>,
}

/// Request for a subset of queue attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetQueueAttributesRequest {
    pub queue_url: String,
    pub attribute_names: Vec<String>,
}

impl GetQueueAttributesRequest {
    pub fn new<I, S>(queue_url: impl Into<String>, attribute_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue_url: queue_url.into(),
            attribute_names: attribute_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Attribute values returned by the backend, keyed by attribute name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueAttributes {
    attributes: HashMap<String, String>,
}

impl QueueAttributes {
    pub fn new(attributes: HashMap<String, String>) -> Self {
        Self { attributes }
    }

    /// Get a single attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueueAttributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Request to drop every message in a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeQueueRequest {
    pub queue_url: String,
}

impl PurgeQueueRequest {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
        }
    }
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Capabilities the queue adapter needs from a backend client
///
/// Each method is a single request/response exchange. Implementations decide
/// their own thread safety and connection handling; the adapter adds no
/// locking on top.
#[async_trait]
pub trait SqsBackend: Send + Sync {
    /// Enqueue one message
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageOutput, BackendError>;

    /// Read the requested queue attributes
    async fn get_queue_attributes(
        &self,
        request: GetQueueAttributesRequest,
    ) -> Result<QueueAttributes, BackendError>;

    /// Drop all messages in the queue
    async fn purge_queue(&self, request: PurgeQueueRequest) -> Result<(), BackendError>;
}
