//! Tests for the message contract and queue identifier.

use super::*;

mod queue_identifier_tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        let name = QueueIdentifier::new("testQueueName").unwrap();
        assert_eq!(name.as_str(), "testQueueName");
        assert!(!name.is_url());

        let url =
            QueueIdentifier::new("https://sqs.us-east-1.amazonaws.com/123456789012/jobs").unwrap();
        assert!(url.is_url());

        let local = QueueIdentifier::new("http://localhost:4566/000000000000/jobs").unwrap();
        assert!(local.is_url());
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(matches!(
            QueueIdentifier::new(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            QueueIdentifier::new("   "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        assert!(matches!(
            QueueIdentifier::new(" jobs"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            "jobs\n".parse::<QueueIdentifier>(),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_display_matches_input() {
        let id: QueueIdentifier = "testQueueName".parse().unwrap();
        assert_eq!(id.to_string(), "testQueueName");
        let as_ref: &str = id.as_ref();
        assert_eq!(as_ref, "testQueueName");
    }
}

mod message_contract_tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Job {
        id: u32,
        kind: &'static str,
    }

    #[test]
    fn test_string_messages_serialize_verbatim() {
        let owned = String::from("fancy_serialized_message");
        assert_eq!(owned.serialize(), "fancy_serialized_message");
        assert_eq!("plain body".serialize(), "plain body");

        let by_ref: &dyn Message = &owned;
        assert_eq!(by_ref.serialize(), "fancy_serialized_message");
    }

    #[test]
    fn test_json_message_renders_once() {
        let message = JsonMessage::new(&Job {
            id: 7,
            kind: "import",
        })
        .unwrap();

        assert_eq!(message.as_str(), r#"{"id":7,"kind":"import"}"#);
        assert_eq!(message.serialize(), message.serialize());
    }
}
