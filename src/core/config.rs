use std::env;

use crate::errors::QueueError;

/// Largest body SQS accepts inline, and the cumulative byte budget of one batch.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 256_000;

/// Most entries a single `SendMessageBatch` call may carry.
pub const DEFAULT_MAX_BATCH_COUNT: usize = 10;

/// Count and byte bounds applied when grouping entries into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_count: usize,
    pub max_bytes: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_BATCH_COUNT,
            max_bytes: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Bucket receiving offloaded bodies. Without it only inline messages can be sent.
    pub extended_client_bucket: Option<String>,
    /// Endpoint override, set when running against `LocalStack`.
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
    pub forward_queue: Option<String>,
    pub limits: BatchLimits,
}

impl ClientConfig {
    /// # Errors
    ///
    /// Returns a configuration error if a limit variable is present but not a positive integer.
    pub fn from_env() -> Result<Self, QueueError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a limit variable is present but not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QueueError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint_url = match (lookup("LOCALSTACK_HOSTNAME"), lookup("EDGE_PORT")) {
            (Some(host), Some(port)) => Some(format!("http://{host}:{port}")),
            _ => None,
        };

        let defaults = BatchLimits::default();
        let limits = BatchLimits {
            max_count: parse_limit(&lookup, "SQS_MAX_BATCH_COUNT", defaults.max_count)?,
            max_bytes: parse_limit(&lookup, "SQS_MAX_MESSAGE_SIZE", defaults.max_bytes)?,
        };

        Ok(Self {
            extended_client_bucket: non_empty(lookup("EXTENDED_CLIENT_BUCKET")),
            endpoint_url,
            region: non_empty(lookup("AWS_REGION")),
            forward_queue: non_empty(lookup("FORWARD_QUEUE")),
            limits,
        })
    }

    /// Config for a client offloading into `bucket` with default limits.
    #[must_use]
    pub fn with_bucket(bucket: impl Into<String>) -> Self {
        Self {
            extended_client_bucket: Some(bucket.into()),
            ..Self::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_limit<F>(lookup: &F, key: &str, default: usize) -> Result<usize, QueueError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup(key)) else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(QueueError::Configuration(format!("{key}: must be greater than zero"))),
        Ok(value) => Ok(value),
        Err(e) => Err(QueueError::Configuration(format!("{key}: {e}"))),
    }
}
