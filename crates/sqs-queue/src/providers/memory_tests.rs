//! Tests for the in-memory backend.

use super::*;
use crate::error::QueueError;
use crate::message::{JsonMessage, QueueIdentifier};
use crate::queue::{Queue, SqsQueue};
use std::sync::Arc;

const QUEUE_URL: &str = "memory://jobs";

fn create_backend() -> InMemorySqsBackend {
    let backend = InMemorySqsBackend::new();
    backend.create_queue(QUEUE_URL).unwrap();
    backend
}

#[tokio::test]
async fn test_send_appends_in_order() {
    let backend = create_backend();

    let first = backend
        .send_message(SendMessageRequest::new(QUEUE_URL, "first"))
        .await
        .unwrap();
    let second = backend
        .send_message(SendMessageRequest::new(QUEUE_URL, "second"))
        .await
        .unwrap();

    assert_eq!(backend.messages(QUEUE_URL).unwrap(), vec!["first", "second"]);

    assert!(first.message_id.is_some());
    assert!(second.message_id.is_some());
    assert_ne!(first.message_id, second.message_id);
}

#[tokio::test]
async fn test_count_attribute_tracks_queue_length() {
    let backend = create_backend();
    let request = || GetQueueAttributesRequest::new(QUEUE_URL, [APPROXIMATE_NUMBER_OF_MESSAGES]);

    let attributes = backend.get_queue_attributes(request()).await.unwrap();
    assert_eq!(attributes.get(APPROXIMATE_NUMBER_OF_MESSAGES), Some("0"));

    backend
        .send_message(SendMessageRequest::new(QUEUE_URL, "body"))
        .await
        .unwrap();

    let attributes = backend.get_queue_attributes(request()).await.unwrap();
    assert_eq!(attributes.get(APPROXIMATE_NUMBER_OF_MESSAGES), Some("1"));
}

#[tokio::test]
async fn test_unknown_attributes_are_omitted() {
    let backend = create_backend();

    let attributes = backend
        .get_queue_attributes(GetQueueAttributesRequest::new(QUEUE_URL, ["QueueArn"]))
        .await
        .unwrap();

    assert!(attributes.is_empty());
}

#[tokio::test]
async fn test_purge_empties_queue() {
    let backend = create_backend();
    for body in ["a", "b", "c"] {
        backend
            .send_message(SendMessageRequest::new(QUEUE_URL, body))
            .await
            .unwrap();
    }

    backend
        .purge_queue(PurgeQueueRequest::new(QUEUE_URL))
        .await
        .unwrap();

    assert!(backend.messages(QUEUE_URL).unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_queue_is_not_found() {
    let backend = InMemorySqsBackend::new();

    let send = backend
        .send_message(SendMessageRequest::new("memory://missing", "body"))
        .await;
    assert!(matches!(send, Err(BackendError::QueueNotFound(_))));

    let purge = backend
        .purge_queue(PurgeQueueRequest::new("memory://missing"))
        .await;
    assert!(matches!(purge, Err(BackendError::QueueNotFound(_))));

    assert!(matches!(
        backend.messages("memory://missing"),
        Err(BackendError::QueueNotFound(_))
    ));
}

#[tokio::test]
async fn test_create_queue_keeps_existing_messages() {
    let backend = create_backend();
    backend
        .send_message(SendMessageRequest::new(QUEUE_URL, "kept"))
        .await
        .unwrap();

    backend.create_queue(QUEUE_URL).unwrap();

    assert_eq!(backend.messages(QUEUE_URL).unwrap(), vec!["kept"]);
}

#[tokio::test]
async fn test_adapter_over_memory_backend() {
    let backend = Arc::new(create_backend());
    let queue = SqsQueue::new(
        Arc::clone(&backend),
        QueueIdentifier::new(QUEUE_URL).unwrap(),
    );

    assert_eq!(queue.count().await.unwrap(), 0);

    let message = JsonMessage::new(&serde_json::json!({ "job": "reindex" })).unwrap();
    queue.add(&message).await.unwrap();
    queue.add(&"plain").await.unwrap();

    assert_eq!(queue.count().await.unwrap(), 2);
    assert_eq!(
        backend.messages(QUEUE_URL).unwrap(),
        vec![r#"{"job":"reindex"}"#, "plain"]
    );

    queue.clear().await.unwrap();
    assert_eq!(queue.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_adapter_reports_missing_queue() {
    let backend = Arc::new(InMemorySqsBackend::new());
    let queue = SqsQueue::new(backend, QueueIdentifier::new("memory://nowhere").unwrap());

    assert!(matches!(
        queue.count().await,
        Err(QueueError::BackendRequestFailed {
            source: BackendError::QueueNotFound(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_concurrent_adds() {
    let backend = Arc::new(create_backend());
    let queue = Arc::new(SqsQueue::new(
        Arc::clone(&backend),
        QueueIdentifier::new(QUEUE_URL).unwrap(),
    ));

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.add(&format!("message-{}", i)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(queue.count().await.unwrap(), 20);
}
