use crate::models::UploadRequest;
use crate::services::storage::{ObjectStorage, StorageError};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Failed to write staging file in {dir}: {source}")]
    Write {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove staging file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid upload: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    staging_dir: PathBuf,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, staging_dir: PathBuf) -> Self {
        Self {
            storage,
            staging_dir,
        }
    }

    /// Stage the upload on local disk, put it into the bucket under its
    /// filename, then remove the staging file.
    ///
    /// The staging file is removed on every exit path. A failed removal after
    /// a successful put is still reported as a failure.
    pub async fn upload_file(
        &self,
        request_id: &str,
        request: UploadRequest,
    ) -> Result<String, UploadError> {
        if request.file_name.is_empty() {
            return Err(UploadError::InvalidRequest(
                "file name must not be empty".to_string(),
            ));
        }

        let key = request.object_key();
        if needs_key_review(key) {
            warn!(
                "⚠️  Object key {:?} contains path separators or control characters, storing verbatim",
                key
            );
        }

        let staged = self.stage(request_id, &request.content).await?;
        let put_result = self
            .storage
            .put_object_from_path(key, staged.path())
            .await;

        let staged_path = staged.path().to_path_buf();
        let cleanup = tokio::task::spawn_blocking(move || staged.close())
            .await
            .unwrap_or_else(|e| Err(io::Error::other(e)))
            .map_err(|source| StagingError::Remove {
                path: staged_path,
                source,
            });

        if let Err(e) = put_result {
            if let Err(cleanup_err) = cleanup {
                error!("{}", cleanup_err);
            }
            return Err(e.into());
        }
        cleanup?;

        info!(
            "📦 Stored {} bytes as '{}' in bucket '{}'",
            request.size(),
            key,
            self.storage.bucket()
        );
        Ok(format!("File uploaded : {}", request.file_name))
    }

    /// Write `content` to a fresh file in the staging directory.
    ///
    /// The returned handle deletes the file when dropped.
    async fn stage(&self, request_id: &str, content: &[u8]) -> Result<NamedTempFile, StagingError> {
        let write_err = |source: io::Error| StagingError::Write {
            dir: self.staging_dir.clone(),
            source,
        };

        let dir = self.staging_dir.clone();
        let prefix = format!("upload-{}-", staging_token(request_id));
        let temp_file = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".part")
                .tempfile_in(&dir)
        })
        .await
        .map_err(|e| write_err(io::Error::other(e)))?
        .map_err(write_err)?;

        let mut writer = tokio::fs::File::from_std(temp_file.reopen().map_err(write_err)?);
        writer.write_all(content).await.map_err(write_err)?;
        writer.flush().await.map_err(write_err)?;

        Ok(temp_file)
    }
}

/// Reduce a request id to characters safe inside a file name.
fn staging_token(request_id: &str) -> String {
    let token: String = request_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(64)
        .collect();
    if token.is_empty() {
        "anonymous".to_string()
    } else {
        token
    }
}

fn needs_key_review(key: &str) -> bool {
    key == "."
        || key == ".."
        || key.contains('/')
        || key.contains('\\')
        || key.chars().any(char::is_control)
}
