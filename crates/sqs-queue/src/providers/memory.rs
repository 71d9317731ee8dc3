//! In-memory backend for testing and development.
//!
//! Stores messages per queue URL in process memory and answers the three
//! backend requests the adapter issues. Unlike SQS, the reported message count
//! is exact and purges take effect immediately.

use crate::backend::{
    GetQueueAttributesRequest, PurgeQueueRequest, QueueAttributes, SendMessageOutput,
    SendMessageRequest, SqsBackend, APPROXIMATE_NUMBER_OF_MESSAGES,
};
use crate::error::BackendError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

/// Thread-safe in-memory backend
///
/// Queues must be created with [`InMemorySqsBackend::create_queue`] before use;
/// requests naming any other queue fail with [`BackendError::QueueNotFound`],
/// the same way SQS answers for a queue that does not exist.
#[derive(Debug, Default)]
pub struct InMemorySqsBackend {
    queues: RwLock<HashMap<String, VecDeque<String>>>,
}

impl InMemorySqsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue; existing queues keep their messages
    pub fn create_queue(&self, queue_url: impl Into<String>) -> Result<(), BackendError> {
        self.write()?.entry(queue_url.into()).or_default();
        Ok(())
    }

    /// Bodies of the stored messages, oldest first
    pub fn messages(&self, queue_url: &str) -> Result<Vec<String>, BackendError> {
        let queues = self.read()?;
        let queue = queues
            .get(queue_url)
            .ok_or_else(|| BackendError::QueueNotFound(queue_url.to_string()))?;

        Ok(queue.iter().cloned().collect())
    }


    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, VecDeque<String>>>, BackendError> {
        self.queues
            .read()
            .map_err(|_| BackendError::Service("In-memory queue storage is poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, VecDeque<String>>>, BackendError> {
        self.queues
            .write()
            .map_err(|_| BackendError::Service("In-memory queue storage is poisoned".to_string()))
    }
}

#[async_trait]
impl SqsBackend for InMemorySqsBackend {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageOutput, BackendError> {
        let mut queues = self.write()?;
        let queue = queues
            .get_mut(&request.queue_url)
            .ok_or_else(|| BackendError::QueueNotFound(request.queue_url.clone()))?;

        let message_id = uuid::Uuid::new_v4().to_string();
        queue.push_back(request.message_body);

        debug!(queue = %request.queue_url, message_id = %message_id, "Stored message in memory");
        Ok(SendMessageOutput {
            message_id: Some(message_id),
        })
    }

    async fn get_queue_attributes(
        &self,
        request: GetQueueAttributesRequest,
    ) -> Result<QueueAttributes, BackendError> {
        let queues = self.read()?;
        let queue = queues
            .get(&request.queue_url)
            .ok_or_else(|| BackendError::QueueNotFound(request.queue_url.clone()))?;

        // Only attributes this backend knows about are returned, as with SQS
        Ok(request
            .attribute_names
            .iter()
            .filter(|name| name.as_str() == APPROXIMATE_NUMBER_OF_MESSAGES)
            .map(|name| (name.clone(), queue.len().to_string()))
            .collect())
    }

    async fn purge_queue(&self, request: PurgeQueueRequest) -> Result<(), BackendError> {
        let mut queues = self.write()?;
        let queue = queues
            .get_mut(&request.queue_url)
            .ok_or_else(|| BackendError::QueueNotFound(request.queue_url.clone()))?;

        let purged = queue.len();
        queue.clear();

        debug!(queue = %request.queue_url, purged, "Purged in-memory queue");
        Ok(())
    }
}
