use crate::config::StorageConfig;
use crate::services::storage::{ObjectStorage, S3ObjectStorage};
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds S3 clients from static credentials bound to one region.
///
/// Nothing here talks to the network; bad credentials only show up on the
/// first request made with the client.
#[derive(Clone)]
pub struct StorageClientFactory {
    access_key: String,
    secret_key: String,
    region: String,
    endpoint_url: Option<String>,
}

impl StorageClientFactory {
    pub fn new(access_key: String, secret_key: String, region: String) -> Self {
        Self {
            access_key,
            secret_key,
            region,
            endpoint_url: None,
        }
    }

    /// Route requests to an S3-compatible endpoint using path-style addressing.
    pub fn with_endpoint(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            config.region.clone(),
        )
        .with_endpoint(config.endpoint_url.clone())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub async fn build_client(&self) -> aws_sdk_s3::Client {
        let mut loader = aws_config::from_env()
            .region(Region::new(self.region.clone()))
            .credentials_provider(Credentials::new(
                self.access_key.clone(),
                self.secret_key.clone(),
                None,
                None,
                "static",
            ));
        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let aws_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(self.endpoint_url.is_some())
            .build();

        aws_sdk_s3::Client::from_conf(s3_config)
    }
}

pub async fn setup_storage(config: &StorageConfig) -> Arc<dyn ObjectStorage> {
    let factory = StorageClientFactory::from_config(config);
    info!(
        "☁️  S3 Storage: region={} endpoint={} (Bucket: {})",
        factory.region(),
        config.endpoint_url.as_deref().unwrap_or("default"),
        config.bucket
    );

    let storage = S3ObjectStorage::new(factory.build_client().await, config.bucket.clone());

    match storage.check_bucket().await {
        Ok(()) => info!("✅ Bucket '{}' is ready", config.bucket),
        Err(e) => warn!(
            "⚠️  Bucket '{}' is not reachable yet, uploads will fail until it is: {}",
            config.bucket, e
        ),
    }

    Arc::new(storage)
}
