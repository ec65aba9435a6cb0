use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use validator::Validate;

pub const ACCESS_KEY_VAR: &str = "ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const REGION_VAR: &str = "REGION";
pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";
pub const STORAGE_ENDPOINT_VAR: &str = "STORAGE_ENDPOINT";
pub const MAX_FILE_SIZE_VAR: &str = "MAX_FILE_SIZE";
pub const STAGING_DIR_VAR: &str = "STAGING_DIR";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials and target of the object-storage backend
#[derive(Clone, Validate)]
pub struct StorageConfig {
    #[validate(length(min = 1))]
    pub access_key: String,

    #[validate(length(min = 1))]
    pub secret_key: String,

    #[validate(length(min = 1))]
    pub region: String,

    #[validate(length(min = 1))]
    pub bucket: String,

    /// Custom endpoint for S3-compatible backends (MinIO, etc.)
    pub endpoint_url: Option<String>,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// HTTP-side settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum upload size in bytes (default: 100 MB)
    pub max_file_size: usize,

    /// Directory for staging files (default: OS temp dir)
    pub staging_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100 MB
            staging_dir: env::temp_dir(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let storage = StorageConfig {
            access_key: read(ACCESS_KEY_VAR),
            secret_key: read(SECRET_KEY_VAR),
            region: read(REGION_VAR),
            bucket: read(BUCKET_NAME_VAR),
            endpoint_url: Some(read(STORAGE_ENDPOINT_VAR)).filter(|v| !v.is_empty()),
        };

        if let Err(errors) = storage.validate() {
            let mut missing: Vec<&'static str> = errors
                .field_errors()
                .keys()
                .filter_map(|field| env_var_for_field(&field.to_string()))
                .collect();
            missing.sort_unstable();
            return Err(ConfigError::Missing(missing));
        }

        let default = ServerConfig::default();
        let max_file_size = match lookup(MAX_FILE_SIZE_VAR) {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: MAX_FILE_SIZE_VAR,
                value: v.clone(),
            })?,
            None => default.max_file_size,
        };
        let staging_dir = lookup(STAGING_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(default.staging_dir);

        Ok(Self {
            storage,
            server: ServerConfig {
                max_file_size,
                staging_dir,
            },
        })
    }
}

fn env_var_for_field(field: &str) -> Option<&'static str> {
    match field {
        "access_key" => Some(ACCESS_KEY_VAR),
        "secret_key" => Some(SECRET_KEY_VAR),
        "region" => Some(REGION_VAR),
        "bucket" => Some(BUCKET_NAME_VAR),
        _ => None,
    }
}
