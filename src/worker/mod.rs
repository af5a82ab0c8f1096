//! Helpers for consumers that pass received messages on to another queue

pub mod forward;

pub use forward::{forward_all, forward_original, forward_queue_from, forward_raw};
