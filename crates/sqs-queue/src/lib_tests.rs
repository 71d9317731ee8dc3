//! Tests for the crate root re-exports.

use super::*;
use std::sync::Arc;

#[test]
fn test_attribute_name_constant() {
    assert_eq!(APPROXIMATE_NUMBER_OF_MESSAGES, "ApproximateNumberOfMessages");
}

#[tokio::test]
async fn test_public_api_round_trip() {
    let backend = Arc::new(InMemorySqsBackend::new());
    backend.create_queue("memory://root").unwrap();

    let queue: Box<dyn Queue> = Box::new(SqsQueue::new(
        backend,
        QueueIdentifier::new("memory://root").unwrap(),
    ));

    queue.add(&"payload").await.unwrap();
    assert_eq!(queue.count().await.unwrap(), 1);
    queue.clear().await.unwrap();
    assert_eq!(queue.count().await.unwrap(), 0);
}

#[test]
fn test_backend_handle_is_shared() {
    let backend = Arc::new(InMemorySqsBackend::new());
    let queue = SqsQueue::new(
        Arc::clone(&backend),
        QueueIdentifier::new("memory://root").unwrap(),
    );

    assert!(Arc::ptr_eq(queue.backend(), &backend));

    let cloned = queue.clone();
    assert_eq!(cloned.queue(), queue.queue());
    assert_eq!(Arc::strong_count(&backend), 3);
}
