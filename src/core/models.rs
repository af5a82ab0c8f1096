use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clients::pointer;

/// Location of an offloaded body: the bucket and the object key inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointerPayload {
    #[serde(rename = "s3BucketName")]
    pub bucket: String,
    #[serde(rename = "s3Key")]
    pub key: String,
}

impl PointerPayload {
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// What a queue body carries: the message itself or a pointer to where it was offloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueBody {
    Inline(String),
    Pointer(PointerPayload),
}

impl QueueBody {
    /// Classifies a raw body received from the queue. Only a body matching the
    /// pointer envelope exactly becomes a `Pointer`.
    #[must_use]
    pub fn from_wire(body: String) -> Self {
        match pointer::decode(&body) {
            Some(payload) => QueueBody::Pointer(payload),
            None => QueueBody::Inline(body),
        }
    }

    #[must_use]
    pub fn into_wire(self) -> String {
        match self {
            QueueBody::Inline(body) => body,
            QueueBody::Pointer(payload) => pointer::encode(&payload.bucket, &payload.key),
        }
    }
}

/// One entry of a `SendMessageBatch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: String,
    pub body: String,
}

impl QueueEntry {
    /// Entry with a freshly generated id.
    #[must_use]
    pub fn new(body: String) -> Self {
        Self::with_id(new_token(), body)
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>, body: String) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Size the body counts against the batch byte budget.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.body.len()
    }
}

/// Unique token used for entry ids and offload keys.
#[must_use]
pub fn new_token() -> String {
    Uuid::new_v4().to_string()
}
