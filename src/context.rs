/// Application context and dependency wiring
use crate::{
    blob_store::{BlobBackend, DiskBackend},
    config::{BlobstoreConfig, ServerConfig},
    db,
    error::{ApiError, ApiResult},
    service::{CategoryService, ImageService, ProductService},
    store::{CategoryStore, ImageStore, ProductStore},
    upload::Uploader,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub blobs: Arc<dyn BlobBackend>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub images: Arc<ImageService>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        Ok(Self::assemble(config, db))
    }

    /// Wire services over an already-migrated pool
    pub fn assemble(config: ServerConfig, db: SqlitePool) -> Self {
        let BlobstoreConfig::Disk { location } = &config.storage.blobstore;
        let blobs: Arc<dyn BlobBackend> = Arc::new(DiskBackend::new(
            location.clone(),
            config.service.public_url.clone(),
        ));
        let uploader = Arc::new(Uploader::new(Arc::clone(&blobs)));

        let categories = Arc::new(CategoryService::new(
            CategoryStore::new(db.clone()),
            ProductStore::new(db.clone()),
        ));
        let images = Arc::new(ImageService::new(
            ImageStore::new(db.clone()),
            Arc::clone(&uploader),
        ));
        let products = Arc::new(ProductService::new(
            ProductStore::new(db),
            Arc::clone(&categories),
            Arc::clone(&images),
        ));

        Self {
            config: Arc::new(config),
            blobs,
            categories,
            products,
            images,
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ApiResult<()> {
        let BlobstoreConfig::Disk { location } = &config.storage.blobstore;
        for dir in [&config.storage.data_directory, location] {
            if !dir.exists() {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    ApiError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
            }
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
