/// Upload manager
///
/// Stages uploaded files into the blob store, resolving filename and
/// extension overrides and guaranteeing idempotent replacement (an
/// existing blob at the target path is deleted before the new write).
use crate::{
    blob_store::BlobBackend,
    error::{ApiError, ApiResult},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// An uploaded file as received from the HTTP layer
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes,
        }
    }

    /// Filename without its extension
    pub fn stem(&self) -> &str {
        match self.original_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.original_name,
        }
    }

    /// Extension without the dot, if any
    pub fn extension(&self) -> Option<&str> {
        match self.original_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

/// Per-call upload configuration
///
/// A plain value built per request; nothing is shared between uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    disk: Option<String>,
    filename: Option<String>,
    extension: Option<String>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a named disk instead of the default one
    pub fn disk(mut self, name: impl Into<String>) -> Self {
        self.disk = Some(name.into());
        self
    }

    /// Override the stored filename stem
    pub fn filename(mut self, stem: impl Into<String>) -> Self {
        self.filename = Some(stem.into());
        self
    }

    /// Override the stored file extension
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = Some(ext.into());
        self
    }
}

/// A successfully stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Final filename within the path prefix
    pub file: String,
    /// Public URL of the stored blob
    pub url: String,
}

/// Stateless upload service over one or more blob backends
pub struct Uploader {
    default_disk: String,
    disks: HashMap<String, Arc<dyn BlobBackend>>,
}

impl Uploader {
    /// Create an uploader with a single default disk
    pub fn new(default: Arc<dyn BlobBackend>) -> Self {
        let mut disks = HashMap::new();
        disks.insert("default".to_string(), default);
        Self {
            default_disk: "default".to_string(),
            disks,
        }
    }

    /// Register an additional named disk
    pub fn with_disk(mut self, name: impl Into<String>, backend: Arc<dyn BlobBackend>) -> Self {
        self.disks.insert(name.into(), backend);
        self
    }

    fn backend(&self, opts: &UploadOptions) -> ApiResult<&Arc<dyn BlobBackend>> {
        let name = opts.disk.as_deref().unwrap_or(&self.default_disk);
        self.disks
            .get(name)
            .ok_or_else(|| ApiError::Upload(format!("Unknown disk: {}", name)))
    }

    /// Resolve the final filename for an upload
    ///
    /// A stem override yields `stem.ext` where the extension falls back to
    /// the original file's; without an override the original name is kept.
    fn resolve_name(file: &UploadedFile, opts: &UploadOptions) -> String {
        match &opts.filename {
            Some(stem) => {
                let ext = opts
                    .extension
                    .as_deref()
                    .or_else(|| file.extension())
                    .unwrap_or("");
                if ext.is_empty() {
                    stem.clone()
                } else {
                    format!("{}.{}", stem, ext)
                }
            }
            None => file.original_name.clone(),
        }
    }

    /// Store a file under `prefix`, replacing any blob already at the
    /// resolved path
    pub async fn upload(
        &self,
        file: UploadedFile,
        prefix: &str,
        opts: UploadOptions,
    ) -> ApiResult<StoredFile> {
        let backend = self.backend(&opts)?;
        let file_name = Self::resolve_name(&file, &opts);
        let path = format!("{}{}", prefix, file_name);

        // Idempotent overwrite: clear the target first
        self.delete_on(backend, &path).await;

        backend.put(&path, file.bytes).await.map_err(|e| {
            error!(component = "upload", operation = "upload", path = %path, "blob put failed: {}", e);
            ApiError::Upload(format!("Failed to store {}", file_name))
        })?;

        Ok(StoredFile {
            file: file_name,
            url: backend.url(&path),
        })
    }

    /// Public URL for a path on the default disk
    pub fn url(&self, path: &str) -> String {
        self.disks
            .get(&self.default_disk)
            .map(|backend| backend.url(path))
            .unwrap_or_default()
    }

    /// Delete a stored blob on the default disk
    ///
    /// True only when a blob existed and was removed; absent blobs and
    /// storage failures both come back false (failures are logged).
    pub async fn delete(&self, path: &str) -> bool {
        match self.disks.get(&self.default_disk) {
            Some(backend) => self.delete_on(backend, path).await,
            None => false,
        }
    }

    async fn delete_on(&self, backend: &Arc<dyn BlobBackend>, path: &str) -> bool {
        match backend.exists(path).await {
            Ok(true) => match backend.delete(path).await {
                Ok(()) => true,
                Err(e) => {
                    error!(component = "upload", operation = "delete", path = %path, "blob delete failed: {}", e);
                    false
                }
            },
            Ok(false) => false,
            Err(e) => {
                error!(component = "upload", operation = "delete", path = %path, "blob exists check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::DiskBackend;
    use tempfile::tempdir;

    fn uploader(dir: &tempfile::TempDir) -> Uploader {
        Uploader::new(Arc::new(DiskBackend::new(
            dir.path().to_path_buf(),
            "http://localhost/files",
        )))
    }

    #[test]
    fn test_uploaded_file_stem_and_extension() {
        let file = UploadedFile::new("photo.large.png", vec![]);
        assert_eq!(file.stem(), "photo.large");
        assert_eq!(file.extension(), Some("png"));

        let bare = UploadedFile::new("README", vec![]);
        assert_eq!(bare.stem(), "README");
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn test_resolve_name_fallbacks() {
        let file = UploadedFile::new("cat.jpg", vec![]);

        // No overrides: original name
        assert_eq!(
            Uploader::resolve_name(&file, &UploadOptions::new()),
            "cat.jpg"
        );
        // Stem override keeps the original extension
        assert_eq!(
            Uploader::resolve_name(&file, &UploadOptions::new().filename("kitten")),
            "kitten.jpg"
        );
        // Explicit extension wins
        assert_eq!(
            Uploader::resolve_name(
                &file,
                &UploadOptions::new().filename("kitten").extension("webp")
            ),
            "kitten.webp"
        );
    }

    #[tokio::test]
    async fn test_upload_and_url() {
        let dir = tempdir().unwrap();
        let up = uploader(&dir);

        let stored = up
            .upload(
                UploadedFile::new("logo.png", b"png bytes".to_vec()),
                "images/",
                UploadOptions::new().filename("brand"),
            )
            .await
            .unwrap();

        assert_eq!(stored.file, "brand.png");
        assert_eq!(stored.url, "http://localhost/files/images/brand.png");
        assert!(dir.path().join("images/brand.png").exists());
    }

    #[tokio::test]
    async fn test_upload_replaces_existing() {
        let dir = tempdir().unwrap();
        let up = uploader(&dir);

        up.upload(
            UploadedFile::new("a.png", b"first".to_vec()),
            "images/",
            UploadOptions::new(),
        )
        .await
        .unwrap();
        up.upload(
            UploadedFile::new("a.png", b"second".to_vec()),
            "images/",
            UploadOptions::new(),
        )
        .await
        .unwrap();

        let data = tokio::fs::read(dir.path().join("images/a.png")).await.unwrap();
        assert_eq!(data, b"second");
    }

    #[tokio::test]
    async fn test_delete_semantics() {
        let dir = tempdir().unwrap();
        let up = uploader(&dir);

        // Absent: false, not an error
        assert!(!up.delete("images/nothing.png").await);

        up.upload(
            UploadedFile::new("x.png", b"data".to_vec()),
            "images/",
            UploadOptions::new(),
        )
        .await
        .unwrap();
        assert!(up.delete("images/x.png").await);
        assert!(!up.delete("images/x.png").await);
    }

    #[tokio::test]
    async fn test_named_disk_routes_to_its_backend() {
        let primary = tempdir().unwrap();
        let archive = tempdir().unwrap();
        let up = uploader(&primary).with_disk(
            "archive",
            Arc::new(DiskBackend::new(
                archive.path().to_path_buf(),
                "http://localhost/archive",
            )),
        );

        let stored = up
            .upload(
                UploadedFile::new("a.png", b"data".to_vec()),
                "images/",
                UploadOptions::new().disk("archive"),
            )
            .await
            .unwrap();

        assert_eq!(stored.url, "http://localhost/archive/images/a.png");
        assert!(archive.path().join("images/a.png").exists());
        assert!(!primary.path().join("images/a.png").exists());
    }

    #[tokio::test]
    async fn test_unknown_disk_fails() {
        let dir = tempdir().unwrap();
        let up = uploader(&dir);

        let result = up
            .upload(
                UploadedFile::new("a.png", vec![]),
                "images/",
                UploadOptions::new().disk("s3"),
            )
            .await;
        assert!(matches!(result, Err(ApiError::Upload(_))));
    }
}
