//! Queue abstraction and the SQS-backed adapter.

use crate::backend::{
    GetQueueAttributesRequest, PurgeQueueRequest, SendMessageRequest, SqsBackend,
    APPROXIMATE_NUMBER_OF_MESSAGES,
};
use crate::error::{BackendError, Operation, QueueError};
use crate::message::{Message, QueueIdentifier};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

/// Uniform queue interface
#[async_trait]
pub trait Queue: Send + Sync {
    /// Enqueue a message
    async fn add(&self, message: &dyn Message) -> Result<(), QueueError>;

    /// Approximate number of pending messages, as reported by the backend
    async fn count(&self) -> Result<u64, QueueError>;

    /// Ask the backend to drop all messages
    async fn clear(&self) -> Result<(), QueueError>;
}

/// Queue adapter over an [`SqsBackend`]
///
/// Every operation is one request to the backend against the queue fixed at
/// construction. The adapter keeps no count, buffer or cache: `count` always
/// reports whatever the backend currently estimates, and `clear` leaves the
/// adapter itself untouched.
///
/// The backend handle is shared, not owned; its lifecycle stays with the
/// caller.
pub struct SqsQueue<B: ?Sized> {
    backend: Arc<B>,
    queue: QueueIdentifier,
}

impl<B: SqsBackend + ?Sized> SqsQueue<B> {
    /// Create adapter for `queue` on `backend`
    pub fn new(backend: Arc<B>, queue: QueueIdentifier) -> Self {
        Self { backend, queue }
    }

    /// Queue this adapter targets
    pub fn queue(&self) -> &QueueIdentifier {
        &self.queue
    }

    /// Shared backend handle
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    fn request_failed(&self, operation: Operation, source: BackendError) -> QueueError {
        warn!(
            queue = %self.queue,
            operation = %operation,
            error = %source,
            "Queue backend request failed"
        );
        QueueError::BackendRequestFailed {
            operation,
            queue: self.queue.to_string(),
            source,
        }
    }
}

impl<B: ?Sized> Clone for SqsQueue<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            queue: self.queue.clone(),
        }
    }
}

impl<B: ?Sized> fmt::Debug for SqsQueue<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqsQueue")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<B: SqsBackend + ?Sized> Queue for SqsQueue<B> {
    async fn add(&self, message: &dyn Message) -> Result<(), QueueError> {
        let request = SendMessageRequest::new(self.queue.as_str(), message.serialize());
        debug!(
            queue = %self.queue,
            body_len = request.message_body.len(),
            "Sending message"
        );

        let output = self
            .backend
            .send_message(request)
            .await
            .map_err(|e| self.request_failed(Operation::SendMessage, e))?;

        debug!(
            queue = %self.queue,
            message_id = output.message_id.as_deref().unwrap_or("<none>"),
            "Message sent"
        );
        Ok(())
    }

    async fn count(&self) -> Result<u64, QueueError> {
        let request =
            GetQueueAttributesRequest::new(self.queue.as_str(), [APPROXIMATE_NUMBER_OF_MESSAGES]);
        debug!(queue = %self.queue, "Querying approximate message count");

        let attributes = self
            .backend
            .get_queue_attributes(request)
            .await
            .map_err(|e| self.request_failed(Operation::GetQueueAttributes, e))?;

        let value = attributes
            .get(APPROXIMATE_NUMBER_OF_MESSAGES)
            .ok_or_else(|| {
                warn!(queue = %self.queue, "Backend response omitted message count attribute");
                QueueError::AttributeMissing {
                    attribute: APPROXIMATE_NUMBER_OF_MESSAGES.to_string(),
                    queue: self.queue.to_string(),
                }
            })?;

        value
            .trim()
            .parse::<u64>()
            .map_err(|_| QueueError::InvalidAttributeValue {
                attribute: APPROXIMATE_NUMBER_OF_MESSAGES.to_string(),
                queue: self.queue.to_string(),
                value: value.to_string(),
            })
    }

    async fn clear(&self) -> Result<(), QueueError> {
        debug!(queue = %self.queue, "Purging queue");

        self.backend
            .purge_queue(PurgeQueueRequest::new(self.queue.as_str()))
            .await
            .map_err(|e| self.request_failed(Operation::PurgeQueue, e))
    }
}
