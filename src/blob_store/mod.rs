/// Blob storage
///
/// Key-addressed file storage behind a backend trait so the upload
/// pipeline never touches filesystem details directly.
pub mod disk;

pub use disk::DiskBackend;

use crate::error::ApiResult;
use async_trait::async_trait;

/// Blob storage backend trait
///
/// Paths are relative keys like `images/logo.png`; implementations map
/// them onto their own layout.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store a blob at the given path, overwriting any existing one
    async fn put(&self, path: &str, data: Vec<u8>) -> ApiResult<()>;

    /// Retrieve a blob by path
    async fn get(&self, path: &str) -> ApiResult<Option<Vec<u8>>>;

    /// Delete a blob; absent blobs are not an error
    async fn delete(&self, path: &str) -> ApiResult<()>;

    /// Check if a blob exists
    async fn exists(&self, path: &str) -> ApiResult<bool>;

    /// Public URL for a stored path
    fn url(&self, path: &str) -> String;
}
