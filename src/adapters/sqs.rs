//! SQS queue adapter

use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::operation::get_queue_url::GetQueueUrlError;
use aws_sdk_sqs::operation::send_message_batch::SendMessageBatchOutput;
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::QueueAdapter;
use super::aws::AwsSettings;
use crate::core::models::QueueEntry;
use crate::errors::QueueError;

/// Upper bound SQS allows for `MaxNumberOfMessages` on a receive call.
const RECEIVE_MAX_MESSAGES: i32 = 10;

/// Queue adapter backed by SQS.
///
/// The SDK client is built on first use and kept for the adapter's lifetime.
/// Concurrent first calls race inside the `OnceCell`; one client wins and is shared.
pub struct SqsQueue {
    settings: AwsSettings,
    client: OnceCell<SqsClient>,
}

impl SqsQueue {
    #[must_use]
    pub fn new(settings: AwsSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &SqsClient {
        self.client
            .get_or_init(|| async {
                debug!(endpoint = ?self.settings.endpoint_url, "Creating SQS client");
                SqsClient::new(&self.settings.load().await)
            })
            .await
    }
}

fn queue_lookup_error<R: std::fmt::Debug>(
    name: &str,
    error: SdkError<GetQueueUrlError, R>,
) -> QueueError {
    if error
        .as_service_error()
        .is_some_and(GetQueueUrlError::is_queue_does_not_exist)
    {
        QueueError::NotFound(format!("queue {name}"))
    } else {
        error.into()
    }
}

/// SQS answers a batch with per-entry results; any rejected entry fails the call.
fn rejected_entries(output: &SendMessageBatchOutput) -> Result<(), QueueError> {
    let failed = output.failed();
    if failed.is_empty() {
        return Ok(());
    }
    let details = failed
        .iter()
        .map(|f| format!("{} ({})", f.id(), f.code()))
        .collect::<Vec<_>>()
        .join(", ");
    warn!(failed = failed.len(), "SQS rejected batch entries: {}", details);
    Err(QueueError::Transport(format!(
        "send_message_batch rejected entries: {details}"
    )))
}

#[async_trait]
impl QueueAdapter for SqsQueue {
    async fn resolve_queue_id(&self, name: &str) -> Result<String, QueueError> {
        match self.client().await.get_queue_url().queue_name(name).send().await {
            Ok(output) => output
                .queue_url()
                .map(str::to_string)
                .ok_or_else(|| QueueError::NotFound(format!("Can not get queue url for {name}"))),
            Err(e) => Err(queue_lookup_error(name, e)),
        }
    }

    async fn send(&self, queue_id: &str, body: &str) -> Result<(), QueueError> {
        self.client()
            .await
            .send_message()
            .queue_url(queue_id)
            .message_body(body)
            .send()
            .await?;
        Ok(())
    }

    async fn send_batch(&self, queue_id: &str, entries: &[QueueEntry]) -> Result<(), QueueError> {
        let request_entries = entries
            .iter()
            .map(|entry| {
                SendMessageBatchRequestEntry::builder()
                    .id(&entry.id)
                    .message_body(&entry.body)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client()
            .await
            .send_message_batch()
            .queue_url(queue_id)
            .set_entries(Some(request_entries))
            .send()
            .await?;

        rejected_entries(&output)
    }

    async fn receive(&self, queue_id: &str) -> Result<Vec<String>, QueueError> {
        let output = self
            .client()
            .await
            .receive_message()
            .queue_url(queue_id)
            .max_number_of_messages(RECEIVE_MAX_MESSAGES)
            .send()
            .await?;

        Ok(output
            .messages()
            .iter()
            .map(|m| m.body().unwrap_or_default().to_string())
            .collect())
    }

    async fn purge(&self, queue_id: &str) -> Result<(), QueueError> {
        self.client()
            .await
            .purge_queue()
            .queue_url(queue_id)
            .send()
            .await?;
        Ok(())
    }

    async fn create(&self, name: &str) -> Result<(), QueueError> {
        self.client()
            .await
            .create_queue()
            .queue_name(name)
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_sqs::types::BatchResultErrorEntry;
    use aws_sdk_sqs::types::error::QueueDoesNotExist;

    use super::*;

    fn rejected(id: &str, code: &str) -> BatchResultErrorEntry {
        BatchResultErrorEntry::builder()
            .id(id)
            .sender_fault(true)
            .code(code)
            .build()
            .unwrap()
    }

    #[test]
    fn fully_accepted_batch_is_ok() {
        let output = SendMessageBatchOutput::builder()
            .set_successful(Some(Vec::new()))
            .set_failed(Some(Vec::new()))
            .build()
            .unwrap();
        assert!(rejected_entries(&output).is_ok());
    }

    #[test]
    fn rejected_entries_fail_the_batch_with_their_ids() {
        let output = SendMessageBatchOutput::builder()
            .set_successful(Some(Vec::new()))
            .failed(rejected("1", "InvalidParameterValue"))
            .failed(rejected("7", "ThrottlingException"))
            .build()
            .unwrap();

        match rejected_entries(&output) {
            Err(QueueError::Transport(message)) => {
                assert!(message.contains("1 (InvalidParameterValue)"));
                assert!(message.contains("7 (ThrottlingException)"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn missing_queue_becomes_not_found() {
        let error = SdkError::service_error(
            GetQueueUrlError::QueueDoesNotExist(QueueDoesNotExist::builder().build()),
            (),
        );
        match queue_lookup_error("orders", error) {
            QueueError::NotFound(what) => assert_eq!(what, "queue orders"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn other_lookup_failures_are_transport() {
        let error = SdkError::<GetQueueUrlError, ()>::construction_failure("bad request");
        assert!(matches!(
            queue_lookup_error("orders", error),
            QueueError::Transport(_)
        ));
    }
}
