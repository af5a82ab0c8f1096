//! Groups outbound entries into `SendMessageBatch` calls.

use crate::core::config::BatchLimits;
use crate::core::models::QueueEntry;

/// Entries sent together in one network call.
pub type Batch = Vec<QueueEntry>;

/// Splits `entries` into batches of at most `limits.max_count` entries whose
/// bodies add up to at most `limits.max_bytes`.
///
/// Entries keep their input order. Only the running total is checked, so an
/// entry that alone exceeds the byte budget still goes out in a batch of its own.
#[must_use]
pub fn plan(entries: Vec<QueueEntry>, limits: BatchLimits) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current: Batch = Vec::new();
    let mut current_bytes = 0usize;

    for entry in entries {
        let entry_bytes = entry.byte_len();
        let over_count = current.len() + 1 > limits.max_count;
        let over_bytes = current_bytes + entry_bytes > limits.max_bytes;
        if !current.is_empty() && (over_count || over_bytes) {
            batches.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current_bytes += entry_bytes;
        current.push(entry);
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
