//! SQS extended client - sends queue messages of any size.
//!
//! SQS rejects bodies above its inline limit. This crate offloads such bodies to
//! S3, enqueues a small pointer envelope in their place, and resolves the pointer
//! again when the message is read.
//!
//! # Architecture
//!
//! The crate is organised as:
//! - `clients` - the extended client, the pointer envelope codec and the batch planner
//! - `adapters` - queue and blob store interfaces with SQS, S3 and in-memory implementations
//! - `worker` - helpers for forwarding received messages to another queue
//! - `core` - configuration and data types
//!
//! # Example
//!
//! ```no_run
//! use sqs_extended::SqsExtendedClient;
//! use sqs_extended::core::config::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     sqs_extended::setup_logging();
//!
//!     let config = ClientConfig::from_env()?;
//!     let client = SqsExtendedClient::from_config(&config);
//!
//!     // Anything over 256,000 bytes goes through S3 transparently
//!     let large = "X".repeat(257 * 1024);
//!     client
//!         .send_to_extended_queue("myQueue", &[large, "small".to_string()])
//!         .await?;
//!
//!     for message in client.read_from_extended_queue("myQueue").await? {
//!         println!("received {} bytes", message.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod clients;
pub mod core;
pub mod errors;
pub mod worker;

pub use clients::{ExtendedQueueClient, SqsExtendedClient};
pub use errors::QueueError;

/// Install a JSON tracing subscriber for the client's logs.
///
/// Events are written as one JSON object per line, filtered by `RUST_LOG`
/// (default `info`).
/// Calling it again after a subscriber is installed has no effect.
///
/// # Example
///
/// ```
/// sqs_extended::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
