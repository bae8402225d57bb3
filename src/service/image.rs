/// Image service
///
/// Owns the upload lifecycle: create stores the blob then the row,
/// update replaces the blob (deleting the old one first), delete removes
/// both. Blobs live under the `images/` prefix.
use crate::{
    error::{ApiError, ApiResult},
    store::{Image, ImageChanges, ImageStore, ListFilters, NewImage, Page},
    upload::{UploadOptions, UploadedFile, Uploader},
};
use std::sync::Arc;

/// Path prefix for stored image blobs
pub const IMAGE_PREFIX: &str = "images/";

/// Fields for an image create
#[derive(Debug, Clone)]
pub struct CreateImage {
    pub name: String,
    pub file: UploadedFile,
}

/// Partial fields for an image update
#[derive(Debug, Clone, Default)]
pub struct UpdateImage {
    pub name: Option<String>,
    pub enable: Option<bool>,
    pub file: Option<UploadedFile>,
}

#[derive(Clone)]
pub struct ImageService {
    images: ImageStore,
    uploader: Arc<Uploader>,
}

impl ImageService {
    pub fn new(images: ImageStore, uploader: Arc<Uploader>) -> Self {
        Self { images, uploader }
    }

    pub async fn list(&self, filters: &ListFilters) -> ApiResult<Page<Image>> {
        Ok(self.images.list(filters).await?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Image> {
        self.images
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))
    }

    /// Upload the file (stored as `{name}.{original ext}`) and insert the row
    pub async fn create(&self, data: CreateImage) -> ApiResult<Image> {
        let stored = self
            .uploader
            .upload(
                data.file,
                IMAGE_PREFIX,
                UploadOptions::new().filename(&data.name),
            )
            .await?;

        Ok(self
            .images
            .create(NewImage {
                name: data.name,
                file: stored.file,
            })
            .await?)
    }

    /// Update an image; a new file replaces the stored blob, removing the
    /// blob at the old key first
    pub async fn update(&self, id: i64, data: UpdateImage) -> ApiResult<Image> {
        let existing = self.get(id).await?;

        let mut changes = ImageChanges {
            name: data.name.clone(),
            enable: data.enable,
            file: None,
        };

        if let Some(file) = data.file {
            self.uploader
                .delete(&format!("{}{}", IMAGE_PREFIX, existing.file))
                .await;

            let stem = data.name.unwrap_or(existing.name);
            let stored = self
                .uploader
                .upload(file, IMAGE_PREFIX, UploadOptions::new().filename(stem))
                .await?;
            changes.file = Some(stored.file);
        }

        Ok(self.images.update(id, changes).await?)
    }

    /// Delete the stored blob, then the row
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let existing = self.get(id).await?;

        self.uploader
            .delete(&format!("{}{}", IMAGE_PREFIX, existing.file))
            .await;

        Ok(self.images.delete(id).await?)
    }

    /// Public URL for an image's stored blob
    pub fn url_for(&self, image: &Image) -> String {
        self.uploader.url(&format!("{}{}", IMAGE_PREFIX, image.file))
    }
}
