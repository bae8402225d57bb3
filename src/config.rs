/// Configuration management for the catalog backend
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Base URL prepended to stored file paths to form public URLs
    pub public_url: String,
    /// Maximum accepted upload size in bytes
    pub upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub blobstore: BlobstoreConfig,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlobstoreConfig {
    Disk { location: PathBuf },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("CATALOG_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("CATALOG_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;

        let public_url = env::var("CATALOG_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}/files", hostname, port));
        let upload_limit = env::var("CATALOG_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "2097152".to_string())
            .parse()
            .unwrap_or(2 * 1024 * 1024);

        let data_directory: PathBuf = env::var("CATALOG_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("CATALOG_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("catalog.sqlite"));

        let blobstore = BlobstoreConfig::Disk {
            location: env::var("CATALOG_BLOBSTORE_DISK_LOCATION")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_directory.join("blobs")),
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                database,
                blobstore,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.service.upload_limit == 0 {
            return Err(ApiError::Validation(
                "Upload limit must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".into(),
                port: 8080,
                public_url: "http://localhost:8080/files".into(),
                upload_limit: 1024,
            },
            storage: StorageConfig {
                data_directory: "./data".into(),
                database: "./data/catalog.sqlite".into(),
                blobstore: BlobstoreConfig::Disk {
                    location: "./data/blobs".into(),
                },
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_hostname() {
        let mut config = sample_config();
        config.service.hostname = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_upload_limit() {
        let mut config = sample_config();
        config.service.upload_limit = 0;
        assert!(config.validate().is_err());
    }
}
