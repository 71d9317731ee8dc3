//! # SQS Queue
//!
//! A thin queue adapter over AWS SQS and SQS-compatible backends.
//!
//! The adapter exposes three operations (add a message, count pending
//! messages, clear the queue) and maps each of them onto exactly one backend
//! request. It keeps no state between calls and never retries, so every
//! failure reported by the backend reaches the caller unchanged.
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for adapter and backend operations
//! - [`message`] - The message contract and the queue identifier
//! - [`backend`] - The narrow backend contract and its request/response types
//! - [`queue`] - The `Queue` abstraction and the `SqsQueue` adapter
//! - [`config`] - Backend connection settings
//! - [`providers`] - HTTP and in-memory backend implementations
//!
//! ## Example
//!
//! ```no_run
//! use sqs_queue::{HttpSqsBackend, Queue, QueueIdentifier, SqsConfig, SqsQueue};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(HttpSqsBackend::new(&SqsConfig::default())?);
//! let queue_url =
//!     QueueIdentifier::new("https://sqs.us-east-1.amazonaws.com/123456789012/jobs")?;
//! let queue = SqsQueue::new(backend, queue_url);
//!
//! queue.add(&"hello").await?;
//! println!("~{} messages pending", queue.count().await?);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod message;
pub mod providers;
pub mod queue;

pub use backend::{
    GetQueueAttributesRequest, PurgeQueueRequest, QueueAttributes, SendMessageOutput,
    SendMessageRequest, SqsBackend, APPROXIMATE_NUMBER_OF_MESSAGES,
};
pub use config::SqsConfig;
pub use error::{BackendError, ConfigurationError, Operation, QueueError, ValidationError};
pub use message::{JsonMessage, Message, QueueIdentifier};
pub use providers::{HttpSqsBackend, InMemorySqsBackend};
pub use queue::{Queue, SqsQueue};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
