use std::error::Error;
use sqs_extended::errors::QueueError;

#[test]
fn test_queue_error_implements_error_trait() {
    // Verify QueueError implements the Error trait
    fn assert_error<T: Error>(_: &T) {}

    let error = QueueError::Transport("test error".to_string());
    assert_error(&error);
}

#[test]
fn test_queue_error_display() {
    let error = QueueError::Transport("throttled".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to interact with AWS services: throttled"
    );

    let error = QueueError::NotFound("s3://bucket/key".to_string());
    assert_eq!(format!("{error}"), "Resource not found: s3://bucket/key");

    let error = QueueError::InvalidLocation("http://x".to_string());
    assert_eq!(format!("{error}"), "Invalid s3 url: http://x");
}

#[test]
fn test_missing_bucket_is_a_configuration_error() {
    match QueueError::missing_bucket() {
        QueueError::Configuration(msg) => {
            assert_eq!(msg, "Extended client bucket is not defined.");
        }
        other => panic!("Unexpected error type: {other:?}"),
    }
}

#[test]
fn test_queue_error_from_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err: QueueError = io.into();
    assert!(matches!(err, QueueError::Transport(msg) if msg.contains("no such file")));

    // The SDK conversion cannot be built without a live request; make sure it exists.
    #[allow(unused)]
    #[allow(clippy::items_after_statements)]
    fn _check_sdk_conversion(
        err: aws_sdk_sqs::error::SdkError<
            aws_sdk_sqs::operation::send_message::SendMessageError,
            aws_sdk_sqs::config::http::HttpResponse,
        >,
    ) -> QueueError {
        QueueError::from(err)
    }
}
