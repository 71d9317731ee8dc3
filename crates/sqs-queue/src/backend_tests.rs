//! Tests for backend request and response types.

use super::*;

#[test]
fn test_attribute_request_keeps_names_in_order() {
    let request = GetQueueAttributesRequest::new(
        "testQueueName",
        [APPROXIMATE_NUMBER_OF_MESSAGES, "QueueArn"],
    );

    assert_eq!(request.queue_url, "testQueueName");
    assert_eq!(
        request.attribute_names,
        vec!["ApproximateNumberOfMessages".to_string(), "QueueArn".to_string()]
    );
}

#[test]
fn test_queue_attributes_lookup() {
    let attributes: QueueAttributes = [(APPROXIMATE_NUMBER_OF_MESSAGES, "12")]
        .into_iter()
        .collect();

    assert_eq!(attributes.get(APPROXIMATE_NUMBER_OF_MESSAGES), Some("12"));
    assert_eq!(attributes.get("QueueArn"), None);
    assert_eq!(attributes.len(), 1);
    assert!(!attributes.is_empty());
}

#[test]
fn test_empty_attributes() {
    let attributes = QueueAttributes::default();
    assert!(attributes.is_empty());
    assert_eq!(attributes.len(), 0);
}
