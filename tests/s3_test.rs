//! Round-trip against a live S3-compatible backend.
//!
//! ```bash
//! docker run -d -p 9000:9000 minio/minio server /data
//! cargo test --test s3_test -- --ignored
//! ```

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bucket_uploader::infrastructure::storage::StorageClientFactory;
use bucket_uploader::services::storage::{ObjectStorage, S3ObjectStorage, StorageErrorKind};
use bucket_uploader::{AppState, create_app};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

const ENDPOINT: &str = "http://127.0.0.1:9000";
const BUCKET: &str = "uploads";

async fn setup_s3(access_key: &str, secret_key: &str) -> (aws_sdk_s3::Client, Arc<S3ObjectStorage>) {
    let client = StorageClientFactory::new(
        access_key.to_string(),
        secret_key.to_string(),
        "us-east-1".to_string(),
    )
    .with_endpoint(Some(ENDPOINT.to_string()))
    .build_client()
    .await;

    // The service never creates buckets; tests prepare their own.
    let _ = client.create_bucket().bucket(BUCKET).send().await;

    let storage = Arc::new(S3ObjectStorage::new(client.clone(), BUCKET.to_string()));
    (client, storage)
}

#[tokio::test]
#[ignore = "requires MinIO on 127.0.0.1:9000"]
async fn test_upload_round_trip_against_minio() {
    let (_client, storage) = setup_s3("minioadmin", "minioadmin").await;
    let staging = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(
        storage.clone(),
        staging.path().to_path_buf(),
        1024 * 1024,
    ));

    let boundary = "---------------------------123456789012345678901234567";
    for content in ["first", "hello"] {
        let multipart_body = format!(
            "--{boundary}\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"report.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            {content}\r\n\
            --{boundary}--\r\n",
            boundary = boundary,
            content = content
        );

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(
                        "Content-Type",
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(multipart_body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        if status != StatusCode::OK {
            panic!(
                "Upload failed with status {}: {:?}",
                status,
                String::from_utf8_lossy(&body)
            );
        }
        assert_eq!(&body[..], b"File uploaded : report.txt");
    }

    assert_eq!(storage.get_object("report.txt").await.unwrap(), b"hello");
    assert!(std::fs::read_dir(staging.path()).unwrap().next().is_none());
}

#[tokio::test]
#[ignore = "requires MinIO on 127.0.0.1:9000"]
async fn test_bad_credentials_are_classified_as_auth() {
    let (_client, storage) = setup_s3("not-a-key", "not-a-secret").await;
    let staging = tempfile::tempdir().unwrap();
    let path = staging.path().join("payload.txt");
    std::fs::write(&path, b"hello").unwrap();

    let err = storage
        .put_object_from_path("report.txt", &path)
        .await
        .unwrap_err();
    assert_eq!(err.kind, StorageErrorKind::Auth);
}

#[tokio::test]
#[ignore = "requires MinIO on 127.0.0.1:9000"]
async fn test_missing_bucket_is_classified_as_not_found() {
    let (client, _storage) = setup_s3("minioadmin", "minioadmin").await;
    let storage = S3ObjectStorage::new(client, "bucket-that-does-not-exist".to_string());

    let err = storage.check_bucket().await.unwrap_err();
    assert_eq!(err.kind, StorageErrorKind::NotFound);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_classified_as_network() {
    let client = StorageClientFactory::new(
        "minioadmin".to_string(),
        "minioadmin".to_string(),
        "us-east-1".to_string(),
    )
    .with_endpoint(Some("http://127.0.0.1:1".to_string()))
    .build_client()
    .await;
    let storage = S3ObjectStorage::new(client, BUCKET.to_string());

    let err = storage.check_bucket().await.unwrap_err();
    assert_eq!(err.kind, StorageErrorKind::Network);
}
