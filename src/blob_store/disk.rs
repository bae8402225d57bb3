/// Disk-based blob storage backend
use crate::{
    blob_store::BlobBackend,
    error::{ApiError, ApiResult},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Disk storage backend
///
/// Stores blobs under a base directory, mirroring the relative key as the
/// on-disk path. Public URLs are the configured base joined with the key.
#[derive(Clone)]
pub struct DiskBackend {
    base_path: PathBuf,
    public_base: String,
}

impl DiskBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf, public_base: impl Into<String>) -> Self {
        Self {
            base_path,
            public_base: public_base.into(),
        }
    }

    /// Resolve a key to its on-disk path
    ///
    /// Keys can arrive from the serving route, so only plain relative
    /// components are accepted; anything with `..`, a root, or a prefix
    /// resolves to `None` and reads as absent.
    fn blob_path(&self, path: &str) -> Option<PathBuf> {
        use std::path::Component;

        let relative = Path::new(path);
        if relative.as_os_str().is_empty() {
            return None;
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => return None,
            }
        }

        Some(self.base_path.join(relative))
    }

    async fn ensure_blob_dir(&self, path: &str) -> ApiResult<PathBuf> {
        let blob_path = self
            .blob_path(path)
            .ok_or_else(|| ApiError::BlobStorage(format!("Invalid blob path: {}", path)))?;
        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ApiError::BlobStorage(format!("Failed to create blob directory: {}", e))
            })?;
        }
        Ok(blob_path)
    }
}

#[async_trait]
impl BlobBackend for DiskBackend {
    async fn put(&self, path: &str, data: Vec<u8>) -> ApiResult<()> {
        let blob_path = self.ensure_blob_dir(path).await?;

        fs::write(&blob_path, data)
            .await
            .map_err(|e| ApiError::BlobStorage(format!("Failed to write blob {}: {}", path, e)))?;

        Ok(())
    }

    async fn get(&self, path: &str) -> ApiResult<Option<Vec<u8>>> {
        let Some(blob_path) = self.blob_path(path) else {
            return Ok(None);
        };

        match fs::read(&blob_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::BlobStorage(format!(
                "Failed to read blob {}: {}",
                path, e
            ))),
        }
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let Some(blob_path) = self.blob_path(path) else {
            return Ok(());
        };

        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::BlobStorage(format!(
                "Failed to delete blob {}: {}",
                path, e
            ))),
        }
    }

    async fn exists(&self, path: &str) -> ApiResult<bool> {
        let Some(blob_path) = self.blob_path(path) else {
            return Ok(false);
        };

        fs::try_exists(&blob_path).await.map_err(|e| {
            ApiError::BlobStorage(format!("Failed to check blob {}: {}", path, e))
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
