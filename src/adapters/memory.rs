//! In-process queue and blob store
//!
//! Both adapters keep everything in memory and record the calls made against
//! them, so tests can check what the extended client actually sent.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BlobStore, QueueAdapter};
use crate::adapters::s3::S3Url;
use crate::core::models::QueueEntry;
use crate::errors::QueueError;

const QUEUE_ID_PREFIX: &str = "memory://queue/";
const RECEIVE_MAX_MESSAGES: usize = 10;

#[derive(Debug, Default)]
pub struct MemoryQueue {
    queues: Mutex<HashMap<String, VecDeque<String>>>,
    batches: Mutex<Vec<Vec<QueueEntry>>>,
    resolve_calls: Mutex<usize>,
}

impl MemoryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch passed to `send_batch`, in call order.
    #[must_use]
    pub fn sent_batches(&self) -> Vec<Vec<QueueEntry>> {
        self.batches.lock().clone()
    }

    #[must_use]
    pub fn resolve_calls(&self) -> usize {
        *self.resolve_calls.lock()
    }

    /// Number of bodies waiting in `name`.
    #[must_use]
    pub fn depth(&self, name: &str) -> usize {
        self.queues.lock().get(name).map_or(0, VecDeque::len)
    }

    fn queue_name(queue_id: &str) -> Result<&str, QueueError> {
        queue_id
            .strip_prefix(QUEUE_ID_PREFIX)
            .ok_or_else(|| QueueError::NotFound(format!("queue id {queue_id}")))
    }

    fn with_queue<T>(
        &self,
        queue_id: &str,
        f: impl FnOnce(&mut VecDeque<String>) -> T,
    ) -> Result<T, QueueError> {
        let name = Self::queue_name(queue_id)?;
        let mut queues = self.queues.lock();
        let queue = queues
            .get_mut(name)
            .ok_or_else(|| QueueError::NotFound(format!("queue {name}")))?;
        Ok(f(queue))
    }
}

#[async_trait]
impl QueueAdapter for MemoryQueue {
    async fn resolve_queue_id(&self, name: &str) -> Result<String, QueueError> {
        *self.resolve_calls.lock() += 1;
        if self.queues.lock().contains_key(name) {
            Ok(format!("{QUEUE_ID_PREFIX}{name}"))
        } else {
            Err(QueueError::NotFound(format!("queue {name}")))
        }
    }

    async fn send(&self, queue_id: &str, body: &str) -> Result<(), QueueError> {
        self.with_queue(queue_id, |queue| queue.push_back(body.to_string()))
    }

    async fn send_batch(&self, queue_id: &str, entries: &[QueueEntry]) -> Result<(), QueueError> {
        self.with_queue(queue_id, |queue| {
            queue.extend(entries.iter().map(|e| e.body.clone()));
        })?;
        self.batches.lock().push(entries.to_vec());
        Ok(())
    }

    async fn receive(&self, queue_id: &str) -> Result<Vec<String>, QueueError> {
        self.with_queue(queue_id, |queue| {
            let take = queue.len().min(RECEIVE_MAX_MESSAGES);
            queue.drain(..take).collect()
        })
    }

    async fn purge(&self, queue_id: &str) -> Result<(), QueueError> {
        self.with_queue(queue_id, VecDeque::clear)
    }

    async fn create(&self, name: &str) -> Result<(), QueueError> {
        self.queues.lock().entry(name.to_string()).or_default();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    buckets: Mutex<HashSet<String>>,
    writes: Mutex<usize>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }

    /// Removes an object, simulating external lifecycle expiry.
    pub fn remove(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .remove(&(bucket.to_string(), key.to_string()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), QueueError> {
        *self.writes.lock() += 1;
        self.objects
            .lock()
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    async fn read(&self, bucket: &str, key: &str) -> Result<Vec<u8>, QueueError> {
        self.objects
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| QueueError::NotFound(S3Url::new(bucket, key).to_string()))
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, QueueError> {
        Ok(self
            .objects
            .lock()
            .contains_key(&(bucket.to_string(), key.to_string())))
    }

    // Writes do not require the bucket to be created first.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, QueueError> {
        Ok(self.buckets.lock().contains(bucket)
            || self.objects.lock().keys().any(|(b, _)| b == bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), QueueError> {
        self.buckets.lock().insert(bucket.to_string());
        Ok(())
    }
}
