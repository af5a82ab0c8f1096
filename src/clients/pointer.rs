//! Pointer envelope codec
//!
//! An offloaded message is replaced on the queue by a two-element JSON array:
//! a fixed type tag followed by the bucket/key object, e.g.
//! `["software.amazon.payloadoffloading.PayloadS3Pointer",{"s3BucketName":"b","s3Key":"k"}]`.
//! This is the same envelope the AWS extended client libraries write, so bodies
//! stay readable by them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use crate::core::models::PointerPayload;

/// Type tag leading every pointer envelope.
pub const LARGE_PAYLOAD_ID: &str = "software.amazon.payloadoffloading.PayloadS3Pointer";

static LARGE_MESSAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"^\["{}",(.*)\]$"#, regex::escape(LARGE_PAYLOAD_ID)))
        .expect("static regex compile")
});

/// Serializes a pointer to `key` inside `bucket`.
#[must_use]
pub fn encode(bucket: &str, key: &str) -> String {
    Value::Array(vec![
        Value::String(LARGE_PAYLOAD_ID.to_string()),
        json!({ "s3BucketName": bucket, "s3Key": key }),
    ])
    .to_string()
}

/// Returns the pointer carried by `body`, or `None` for an ordinary message.
///
/// Never fails: anything not shaped exactly like the envelope is a regular body.
#[must_use]
pub fn decode(body: &str) -> Option<PointerPayload> {
    let captures = LARGE_MESSAGE_RE.captures(body)?;
    serde_json::from_str(captures.get(1)?.as_str()).ok()
}

#[must_use]
pub fn is_pointer(body: &str) -> bool {
    decode(body).is_some()
}
