//! Queue client modules: the extended client and the pure pieces it drives

pub mod batch;
pub mod extended_client;
pub mod pointer;

pub use extended_client::{ExtendedQueueClient, SqsExtendedClient};
