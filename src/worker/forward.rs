//! Forwarding received messages to another queue
//!
//! A consumer either passes bodies on untouched or resolves them and sends the
//! originals through the extended path again.

use futures::future::try_join_all;
use tracing::info;

use crate::adapters::{BlobStore, QueueAdapter};
use crate::clients::ExtendedQueueClient;
use crate::core::config::ClientConfig;
use crate::errors::QueueError;

/// Destination queue for forwarded messages.
///
/// # Errors
///
/// `Configuration` if no forward queue is set.
pub fn forward_queue_from(config: &ClientConfig) -> Result<&str, QueueError> {
    config
        .forward_queue
        .as_deref()
        .ok_or_else(|| QueueError::Configuration("Forward queue parameter not set".to_string()))
}

/// Re-sends a received body unchanged. Pointer envelopes stay pointers.
///
/// # Errors
///
/// Returns the queue adapter's error if the queue is missing or the send fails.
pub async fn forward_raw<Q, B>(
    client: &ExtendedQueueClient<Q, B>,
    queue_name: &str,
    body: &str,
) -> Result<(), QueueError>
where
    Q: QueueAdapter,
    B: BlobStore,
{
    client.send_to_queue(queue_name, body).await
}

/// Resolves a possibly offloaded body and sends the original through the
/// extended path, so it is offloaded again if it is still too large.
///
/// # Errors
///
/// Fails if the stored original cannot be read or the extended send fails.
pub async fn forward_original<Q, B>(
    client: &ExtendedQueueClient<Q, B>,
    queue_name: &str,
    body: &str,
) -> Result<(), QueueError>
where
    Q: QueueAdapter,
    B: BlobStore,
{
    let original = client.to_original_message(body).await?;
    client.send_to_extended_queue(queue_name, &[original]).await
}

/// Forwards every body concurrently, returning how many were sent.
///
/// # Errors
///
/// The first failure from [`forward_original`]; bodies already sent stay sent.
pub async fn forward_all<Q, B, S>(
    client: &ExtendedQueueClient<Q, B>,
    queue_name: &str,
    bodies: &[S],
) -> Result<usize, QueueError>
where
    Q: QueueAdapter,
    B: BlobStore,
    S: AsRef<str>,
{
    try_join_all(
        bodies
            .iter()
            .map(|body| forward_original(client, queue_name, body.as_ref())),
    )
    .await?;
    info!(queue = queue_name, forwarded = bodies.len(), "Forwarded messages");
    Ok(bodies.len())
}
