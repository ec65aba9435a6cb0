use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Broad category of a failed storage call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// Credentials rejected or access denied
    Auth,
    /// Bucket or object does not exist
    NotFound,
    /// Backend could not be reached (connect, DNS, timeout)
    Network,
    /// Backend answered with any other error
    Rejected,
    /// The local file to upload could not be opened
    Payload,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageErrorKind::Auth => "authentication failed",
            StorageErrorKind::NotFound => "not found",
            StorageErrorKind::Network => "unreachable",
            StorageErrorKind::Rejected => "request rejected",
            StorageErrorKind::Payload => "staged payload unreadable",
        };
        f.write_str(name)
    }
}

const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "AuthorizationHeaderMalformed",
];

const NOT_FOUND_ERROR_CODES: &[&str] = &["NoSuchBucket", "NoSuchKey", "NotFound"];

impl StorageErrorKind {
    /// Classify a backend answer from its HTTP status and error code.
    pub fn from_response(status: Option<u16>, code: Option<&str>) -> Self {
        if let Some(code) = code {
            if AUTH_ERROR_CODES.contains(&code) {
                return StorageErrorKind::Auth;
            }
            if NOT_FOUND_ERROR_CODES.contains(&code) {
                return StorageErrorKind::NotFound;
            }
        }
        match status {
            Some(401) | Some(403) => StorageErrorKind::Auth,
            Some(404) => StorageErrorKind::NotFound,
            _ => StorageErrorKind::Rejected,
        }
    }
}

#[derive(Error, Debug)]
#[error("Storage {kind}: {message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn from_sdk<E>(err: SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let kind = match &err {
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StorageErrorKind::Network,
            SdkError::ServiceError(_) | SdkError::ResponseError(_) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                StorageErrorKind::from_response(status, err.code())
            }
            _ => StorageErrorKind::Rejected,
        };
        Self::new(kind, DisplayErrorContext(&err).to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object-storage operations the upload pipeline depends on
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Put the file at `path` into the bucket under `key`, overwriting any existing object.
    async fn put_object_from_path(&self, key: &str, path: &Path) -> StorageResult<()>;
    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>>;
    /// Verify the configured bucket is reachable with the configured credentials.
    async fn check_bucket(&self) -> StorageResult<()>;
    fn bucket(&self) -> &str;
}

pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
}

impl S3ObjectStorage {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put_object_from_path(&self, key: &str, path: &Path) -> StorageResult<()> {
        let body = ByteStream::from_path(path).await.map_err(|e| {
            StorageError::new(
                StorageErrorKind::Payload,
                format!("cannot read staged payload {}: {}", path.display(), e),
            )
        })?;

        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await;

        if let Err(e) = res {
            let err = StorageError::from_sdk(e);
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, error={}",
                self.bucket,
                key,
                err
            );
            return Err(err);
        }
        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(StorageError::from_sdk)?;

        let data = res
            .body
            .collect()
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Network, e.to_string()))?;
        Ok(data.to_vec())
    }

    async fn check_bucket(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(StorageError::from_sdk)?;
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_codes_win_over_status() {
        assert_eq!(
            StorageErrorKind::from_response(Some(400), Some("InvalidAccessKeyId")),
            StorageErrorKind::Auth
        );
        assert_eq!(
            StorageErrorKind::from_response(Some(403), Some("SignatureDoesNotMatch")),
            StorageErrorKind::Auth
        );
    }

    #[test]
    fn test_missing_bucket() {
        assert_eq!(
            StorageErrorKind::from_response(Some(404), Some("NoSuchBucket")),
            StorageErrorKind::NotFound
        );
        // HEAD responses carry no error body
        assert_eq!(
            StorageErrorKind::from_response(Some(404), None),
            StorageErrorKind::NotFound
        );
    }

    #[test]
    fn test_status_fallback() {
        assert_eq!(
            StorageErrorKind::from_response(Some(403), None),
            StorageErrorKind::Auth
        );
        assert_eq!(
            StorageErrorKind::from_response(Some(500), Some("InternalError")),
            StorageErrorKind::Rejected
        );
        assert_eq!(
            StorageErrorKind::from_response(None, None),
            StorageErrorKind::Rejected
        );
    }

    #[tokio::test]
    async fn test_unreadable_staged_file_is_a_payload_error() {
        let client = crate::infrastructure::storage::StorageClientFactory::new(
            "AKIAEXAMPLE".to_string(),
            "secret".to_string(),
            "us-east-1".to_string(),
        )
        .with_endpoint(Some("http://127.0.0.1:1".to_string()))
        .build_client()
        .await;
        let storage = S3ObjectStorage::new(client, "uploads".to_string());
        let staging = tempfile::tempdir().unwrap();

        let err = storage
            .put_object_from_path("report.txt", &staging.path().join("gone.part"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::Payload);
    }

    #[test]
    fn test_error_message_keeps_category() {
        let err = StorageError::new(StorageErrorKind::Network, "connection refused");
        assert_eq!(err.to_string(), "Storage unreachable: connection refused");
    }
}
