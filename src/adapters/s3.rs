//! S3 blob store adapter
//!
//! Besides the bucket/key interface used for offloading, the store can be
//! addressed with `s3://bucket/key` URLs.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use percent_encoding::percent_decode_str;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use super::BlobStore;
use super::aws::AwsSettings;
use crate::errors::QueueError;

/// A parsed `s3://bucket/key` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Url {
    pub bucket: String,
    pub key: String,
}

impl S3Url {
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl FromStr for S3Url {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| QueueError::InvalidLocation(format!("{s}: {e}")))?;
        if url.scheme() != "s3" {
            return Err(QueueError::InvalidLocation(format!("{s}: scheme must be s3")));
        }
        let bucket = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| QueueError::InvalidLocation(format!("{s}: missing bucket")))?;
        let key = percent_decode_str(url.path().trim_start_matches('/'))
            .decode_utf8()
            .map_err(|e| QueueError::InvalidLocation(format!("{s}: {e}")))?;
        if key.is_empty() {
            return Err(QueueError::InvalidLocation(format!("{s}: missing key")));
        }
        Ok(Self::new(bucket, key))
    }
}

impl fmt::Display for S3Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Blob store backed by S3, with the SDK client created lazily like [`super::SqsQueue`].
pub struct S3BlobStore {
    settings: AwsSettings,
    client: OnceCell<S3Client>,
}

impl S3BlobStore {
    #[must_use]
    pub fn new(settings: AwsSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &S3Client {
        self.client
            .get_or_init(|| async {
                debug!(endpoint = ?self.settings.endpoint_url, "Creating S3 client");
                let shared = self.settings.load().await;
                // LocalStack serves buckets on the path, not as subdomains.
                let config = aws_sdk_s3::config::Builder::from(&shared)
                    .force_path_style(self.settings.is_local())
                    .build();
                S3Client::from_conf(config)
            })
            .await
    }
}

/// Maps a head-style call to presence: `Ok` is true, the absence error is false.
fn found<T, E, R>(
    result: Result<T, SdkError<E, R>>,
    is_absent: impl Fn(&E) -> bool,
) -> Result<bool, QueueError>
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.as_service_error().is_some_and(&is_absent) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn object_read_error<R: std::fmt::Debug>(
    bucket: &str,
    key: &str,
    error: SdkError<GetObjectError, R>,
) -> QueueError {
    if error
        .as_service_error()
        .is_some_and(GetObjectError::is_no_such_key)
    {
        QueueError::NotFound(S3Url::new(bucket, key).to_string())
    } else {
        error.into()
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn write(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), QueueError> {
        self.client()
            .await
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await?;
        Ok(())
    }

    async fn read(&self, bucket: &str, key: &str) -> Result<Vec<u8>, QueueError> {
        let output = self
            .client()
            .await
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| object_read_error(bucket, key, e))?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| QueueError::Transport(format!("s3 read body: {e}")))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, QueueError> {
        let result = self
            .client()
            .await
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;
        found(result, HeadObjectError::is_not_found)
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, QueueError> {
        let result = self.client().await.head_bucket().bucket(bucket).send().await;
        found(result, HeadBucketError::is_not_found)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), QueueError> {
        self.client()
            .await
            .create_bucket()
            .bucket(bucket)
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bucket_and_key() {
        let url: S3Url = "s3://my-queue-bucket/abc-123".parse().unwrap();
        assert_eq!(url, S3Url::new("my-queue-bucket", "abc-123"));
    }

    #[test]
    fn keeps_nested_keys_and_decodes_escapes() {
        let url: S3Url = "s3://bucket/a/b/file%20name.json".parse().unwrap();
        assert_eq!(url.key, "a/b/file name.json");
    }

    #[test]
    fn formats_back_to_a_url() {
        let url = S3Url::new("bucket", "k");
        assert_eq!(url.to_string(), "s3://bucket/k");
    }

    #[test]
    fn rejects_other_schemes_and_missing_parts() {
        for bad in [
            "https://bucket/key",
            "s3://bucket",
            "s3://bucket/",
            "not a url",
        ] {
            assert!(
                matches!(bad.parse::<S3Url>(), Err(QueueError::InvalidLocation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn no_such_key_becomes_not_found() {
        let error = SdkError::service_error(
            GetObjectError::NoSuchKey(aws_sdk_s3::types::error::NoSuchKey::builder().build()),
            (),
        );
        match object_read_error("bucket", "gone", error) {
            QueueError::NotFound(what) => assert_eq!(what, "s3://bucket/gone"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn other_read_failures_are_transport() {
        let error = SdkError::<GetObjectError, ()>::construction_failure("bad request");
        assert!(matches!(
            object_read_error("bucket", "k", error),
            QueueError::Transport(_)
        ));
    }

    #[test]
    fn missing_object_or_bucket_is_absent() {
        let object = Err::<(), _>(SdkError::service_error(
            HeadObjectError::NotFound(aws_sdk_s3::types::error::NotFound::builder().build()),
            (),
        ));
        assert!(!found(object, HeadObjectError::is_not_found).unwrap());

        let bucket = Err::<(), _>(SdkError::service_error(
            HeadBucketError::NotFound(aws_sdk_s3::types::error::NotFound::builder().build()),
            (),
        ));
        assert!(!found(bucket, HeadBucketError::is_not_found).unwrap());

        let present = Ok::<_, SdkError<HeadObjectError, ()>>(());
        assert!(found(present, HeadObjectError::is_not_found).unwrap());
    }

    #[test]
    fn head_failures_other_than_absence_propagate() {
        let result = Err::<(), _>(SdkError::<HeadObjectError, ()>::construction_failure(
            "bad request",
        ));
        assert!(matches!(
            found(result, HeadObjectError::is_not_found),
            Err(QueueError::Transport(_))
        ));
    }
}
