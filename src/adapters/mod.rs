//! Adapter layer for the external services the extended client talks to.
//!
//! This module contains:
//! - The queue and blob store interfaces the client is written against
//! - SQS and S3 implementations backed by the AWS SDK
//! - In-memory implementations for tests and local runs

use std::path::Path;

use async_trait::async_trait;

use crate::core::models::QueueEntry;
use crate::errors::QueueError;

pub mod aws;
pub mod memory;
pub mod s3;
pub mod sqs;

pub use memory::{MemoryBlobStore, MemoryQueue};
pub use s3::{S3BlobStore, S3Url};
pub use sqs::SqsQueue;

/// A managed at-least-once message queue.
#[async_trait]
pub trait QueueAdapter: Send + Sync {
    /// Resolves a queue name to the identifier the other calls take.
    ///
    /// Fails with `NotFound` if no queue has that name.
    async fn resolve_queue_id(&self, name: &str) -> Result<String, QueueError>;

    async fn send(&self, queue_id: &str, body: &str) -> Result<(), QueueError>;

    async fn send_batch(&self, queue_id: &str, entries: &[QueueEntry]) -> Result<(), QueueError>;

    /// Returns whatever bodies one receive call yields, possibly none.
    async fn receive(&self, queue_id: &str) -> Result<Vec<String>, QueueError>;

    async fn purge(&self, queue_id: &str) -> Result<(), QueueError>;

    async fn create(&self, name: &str) -> Result<(), QueueError>;
}

/// Object storage addressed by bucket and key.
///
/// The `*_url` methods address the same objects through `s3://bucket/key` URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn write(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), QueueError>;

    /// Fails with `NotFound` if nothing is stored under `key`.
    async fn read(&self, bucket: &str, key: &str) -> Result<Vec<u8>, QueueError>;

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, QueueError>;

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, QueueError>;

    async fn create_bucket(&self, bucket: &str) -> Result<(), QueueError>;

    /// # Errors
    ///
    /// `InvalidLocation` if the URL is malformed; the store's error if the write fails.
    async fn write_to_url(&self, s3_url: &str, content: &str) -> Result<(), QueueError> {
        let url: S3Url = s3_url.parse()?;
        self.write(&url.bucket, &url.key, content.as_bytes().to_vec())
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the local file cannot be read, the URL is malformed, or the write fails.
    async fn write_file_to_url(&self, s3_url: &str, file_path: &Path) -> Result<(), QueueError> {
        let url: S3Url = s3_url.parse()?;
        let content = tokio::fs::read(file_path).await?;
        self.write(&url.bucket, &url.key, content).await
    }

    /// # Errors
    ///
    /// `InvalidLocation` for a malformed URL, `NotFound` for a missing object,
    /// `InvalidPayload` if the object is not UTF-8.
    async fn read_from_url(&self, s3_url: &str) -> Result<String, QueueError> {
        let url: S3Url = s3_url.parse()?;
        let bytes = self.read(&url.bucket, &url.key).await?;
        String::from_utf8(bytes).map_err(|e| QueueError::InvalidPayload(format!("{url}: {e}")))
    }

    /// # Errors
    ///
    /// `InvalidLocation` for a malformed URL; store failures other than absence.
    async fn file_exists(&self, s3_url: &str) -> Result<bool, QueueError> {
        let url: S3Url = s3_url.parse()?;
        self.exists(&url.bucket, &url.key).await
    }
}
