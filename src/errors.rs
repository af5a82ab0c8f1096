use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to interact with AWS services: {0}")]
    Transport(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid s3 url: {0}")]
    InvalidLocation(String),

    #[error("Offloaded payload is not valid UTF-8: {0}")]
    InvalidPayload(String),
}

impl QueueError {
    /// Error raised when a message needs offloading and no bucket is configured.
    #[must_use]
    pub fn missing_bucket() -> Self {
        QueueError::Configuration("Extended client bucket is not defined.".to_string())
    }
}

// SQS and S3 share the same smithy SdkError type, so one impl covers both clients.
impl<E, R> From<SdkError<E, R>> for QueueError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(error: SdkError<E, R>) -> Self {
        QueueError::Transport(DisplayErrorContext(&error).to_string())
    }
}

impl From<aws_sdk_sqs::error::BuildError> for QueueError {
    fn from(error: aws_sdk_sqs::error::BuildError) -> Self {
        QueueError::Transport(format!("request build: {error}"))
    }
}

impl From<std::io::Error> for QueueError {
    fn from(error: std::io::Error) -> Self {
        QueueError::Transport(format!("io: {error}"))
    }
}
