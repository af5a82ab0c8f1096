//! Extended queue client
//!
//! Sends messages larger than the queue's inline limit by writing the body to
//! the blob store and enqueuing a pointer envelope in its place, and reverses
//! the substitution on read.

use futures::future::try_join_all;
use tracing::{debug, info};

use super::batch;
use crate::adapters::aws::AwsSettings;
use crate::adapters::{BlobStore, QueueAdapter, S3BlobStore, SqsQueue};
use crate::core::config::{BatchLimits, ClientConfig};
use crate::core::models::{PointerPayload, QueueBody, QueueEntry, new_token};
use crate::errors::QueueError;

/// The extended client wired to SQS and S3.
pub type SqsExtendedClient = ExtendedQueueClient<SqsQueue, S3BlobStore>;

pub struct ExtendedQueueClient<Q, B> {
    queue: Q,
    blobs: B,
    bucket: Option<String>,
    limits: BatchLimits,
}

impl SqsExtendedClient {
    /// Builds a client whose AWS connections are opened on first use.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        let settings = AwsSettings::from(config);
        Self::new(
            SqsQueue::new(settings.clone()),
            S3BlobStore::new(settings),
            config,
        )
    }
}

impl<Q, B> ExtendedQueueClient<Q, B>
where
    Q: QueueAdapter,
    B: BlobStore,
{
    #[must_use]
    pub fn new(queue: Q, blobs: B, config: &ClientConfig) -> Self {
        Self {
            queue,
            blobs,
            bucket: config.extended_client_bucket.clone(),
            limits: config.limits,
        }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn blob_store(&self) -> &B {
        &self.blobs
    }

    pub async fn create_queue(&self, queue_name: &str) -> Result<(), QueueError> {
        self.queue.create(queue_name).await
    }

    pub async fn purge_queue(&self, queue_name: &str) -> Result<(), QueueError> {
        let queue_id = self.queue.resolve_queue_id(queue_name).await?;
        self.queue.purge(&queue_id).await
    }

    /// Sends one body as is, without size checks or offloading.
    pub async fn send_to_queue(&self, queue_name: &str, message: &str) -> Result<(), QueueError> {
        let queue_id = self.queue.resolve_queue_id(queue_name).await?;
        self.queue.send(&queue_id, message).await
    }

    /// Receives raw bodies; pointer envelopes are returned unresolved.
    pub async fn read_from_queue(&self, queue_name: &str) -> Result<Vec<String>, QueueError> {
        let queue_id = self.queue.resolve_queue_id(queue_name).await?;
        self.queue.receive(&queue_id).await
    }

    /// Sends `messages` in as few batch calls as the limits allow, offloading
    /// every message over the inline size limit to the blob store first.
    ///
    /// Message order is preserved across batches. The bucket requirement is
    /// checked for all messages before anything is written or sent.
    ///
    /// # Errors
    ///
    /// `Configuration` if a message needs offloading and no bucket is set;
    /// otherwise the first adapter failure, unchanged.
    #[tracing::instrument(level = "info", skip(self, messages), fields(messages = messages.len()))]
    pub async fn send_to_extended_queue<S>(
        &self,
        queue_name: &str,
        messages: &[S],
    ) -> Result<(), QueueError>
    where
        S: AsRef<str> + Sync,
    {
        if messages.is_empty() {
            return Ok(());
        }
        if self.bucket.is_none() && messages.iter().any(|m| self.needs_offload(m.as_ref())) {
            return Err(QueueError::missing_bucket());
        }

        let queue_id = self.queue.resolve_queue_id(queue_name).await?;

        // Offloads run concurrently; try_join_all hands entries back in input order.
        let entries =
            try_join_all(messages.iter().map(|m| self.prepare_entry(m.as_ref()))).await?;

        let batches = batch::plan(entries, self.limits);
        let batch_count = batches.len();
        for (index, batch) in batches.iter().enumerate() {
            self.queue.send_batch(&queue_id, batch).await?;
            info!(
                batch = index + 1,
                of = batch_count,
                entries = batch.len(),
                bytes = batch.iter().map(QueueEntry::byte_len).sum::<usize>(),
                "Sent batch"
            );
        }
        Ok(())
    }

    /// Receives bodies and replaces every pointer envelope with the stored original.
    ///
    /// # Errors
    ///
    /// `NotFound` if a pointer references a missing object; adapter failures otherwise.
    pub async fn read_from_extended_queue(
        &self,
        queue_name: &str,
    ) -> Result<Vec<String>, QueueError> {
        let bodies = self.read_from_queue(queue_name).await?;
        try_join_all(bodies.into_iter().map(|body| self.to_original_message(body))).await
    }

    /// Resolves a single already received body.
    ///
    /// # Errors
    ///
    /// `NotFound` if the pointer's object is missing, `InvalidPayload` if it is not UTF-8.
    pub async fn to_original_message(&self, body: impl Into<String>) -> Result<String, QueueError> {
        match QueueBody::from_wire(body.into()) {
            QueueBody::Inline(message) => Ok(message),
            QueueBody::Pointer(payload) => {
                debug!(bucket = %payload.bucket, key = %payload.key, "Resolving offloaded message");
                let bytes = self.blobs.read(&payload.bucket, &payload.key).await?;
                String::from_utf8(bytes).map_err(|e| {
                    QueueError::InvalidPayload(format!(
                        "s3://{}/{}: {e}",
                        payload.bucket, payload.key
                    ))
                })
            }
        }
    }

    /// Writes `message` to the bucket under a fresh key and returns that key.
    ///
    /// # Errors
    ///
    /// `Configuration` if no bucket is set; the blob store's error if the write fails.
    pub async fn store_original_message(&self, message: &str) -> Result<String, QueueError> {
        let bucket = self.bucket.as_deref().ok_or_else(QueueError::missing_bucket)?;
        let key = new_token();
        self.blobs
            .write(bucket, &key, message.as_bytes().to_vec())
            .await?;
        info!(bucket, key = %key, bytes = message.len(), "Offloaded message body");
        Ok(key)
    }

    /// Pointer envelope for `key` in the configured bucket.
    ///
    /// # Errors
    ///
    /// `Configuration` if no bucket is set.
    pub fn large_message_payload(&self, key: &str) -> Result<String, QueueError> {
        let bucket = self.bucket.as_deref().ok_or_else(QueueError::missing_bucket)?;
        Ok(QueueBody::Pointer(PointerPayload::new(bucket, key)).into_wire())
    }

    fn needs_offload(&self, message: &str) -> bool {
        message.len() > self.limits.max_bytes
    }

    async fn prepare_entry(&self, message: &str) -> Result<QueueEntry, QueueError> {
        if !self.needs_offload(message) {
            return Ok(QueueEntry::new(message.to_string()));
        }
        let key = self.store_original_message(message).await?;
        let body = self.large_message_payload(&key)?;
        Ok(QueueEntry::with_id(key, body))
    }
}
