use std::io::Write;

use sqs_extended::QueueError;
use sqs_extended::adapters::{BlobStore, MemoryBlobStore};
use tempfile::NamedTempFile;

const BUCKET: &str = "my-queue-bucket";

#[tokio::test]
async fn writes_and_reads_through_s3_urls() {
    let store = MemoryBlobStore::new();
    store
        .write_to_url("s3://my-queue-bucket/reports/day%201.json", "{\"ok\":true}")
        .await
        .unwrap();

    assert_eq!(
        store.read(BUCKET, "reports/day 1.json").await.unwrap(),
        b"{\"ok\":true}"
    );
    assert_eq!(
        store
            .read_from_url("s3://my-queue-bucket/reports/day%201.json")
            .await
            .unwrap(),
        "{\"ok\":true}"
    );
}

#[tokio::test]
async fn uploads_a_local_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"line one\nline two\n").unwrap();

    let store = MemoryBlobStore::new();
    store
        .write_file_to_url("s3://my-queue-bucket/upload.txt", file.path())
        .await
        .unwrap();

    assert_eq!(
        store.read(BUCKET, "upload.txt").await.unwrap(),
        b"line one\nline two\n"
    );
}

#[tokio::test]
async fn missing_local_file_is_a_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryBlobStore::new();

    let err = store
        .write_file_to_url("s3://my-queue-bucket/upload.txt", &dir.path().join("absent"))
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::Transport(_)));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn file_exists_reflects_stored_objects() {
    let store = MemoryBlobStore::new();
    store.write(BUCKET, "present", b"x".to_vec()).await.unwrap();

    assert!(store.file_exists("s3://my-queue-bucket/present").await.unwrap());
    assert!(!store.file_exists("s3://my-queue-bucket/absent").await.unwrap());
    assert!(!store.file_exists("s3://other-bucket/present").await.unwrap());
}

#[tokio::test]
async fn malformed_urls_are_invalid_locations() {
    let store = MemoryBlobStore::new();

    for bad in ["https://my-queue-bucket/key", "s3://my-queue-bucket", "bucket/key"] {
        assert!(
            matches!(
                store.write_to_url(bad, "x").await,
                Err(QueueError::InvalidLocation(_))
            ),
            "{bad} should be rejected on write"
        );
        assert!(
            matches!(
                store.read_from_url(bad).await,
                Err(QueueError::InvalidLocation(_))
            ),
            "{bad} should be rejected on read"
        );
        assert!(matches!(
            store.file_exists(bad).await,
            Err(QueueError::InvalidLocation(_))
        ));
    }
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn reading_a_missing_url_is_not_found() {
    let store = MemoryBlobStore::new();
    let err = store
        .read_from_url("s3://my-queue-bucket/nothing")
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::NotFound(msg) if msg == "s3://my-queue-bucket/nothing"));
}

#[tokio::test]
async fn non_utf8_object_is_an_invalid_payload() {
    let store = MemoryBlobStore::new();
    store
        .write(BUCKET, "binary", vec![0xff, 0xfe, 0xfd])
        .await
        .unwrap();

    let err = store
        .read_from_url("s3://my-queue-bucket/binary")
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::InvalidPayload(msg) if msg.starts_with("s3://my-queue-bucket/binary")));
}

#[tokio::test]
async fn created_bucket_exists() {
    let store = MemoryBlobStore::new();
    assert!(!store.bucket_exists(BUCKET).await.unwrap());

    store.create_bucket(BUCKET).await.unwrap();
    assert!(store.bucket_exists(BUCKET).await.unwrap());
}
