/// Product service
///
/// The busiest orchestration path: category references are validated
/// before any write, and uploaded files are turned into Image records
/// whose ids are attached to the product in the same store transaction
/// as the entity write.
use crate::{
    error::{ApiError, ApiResult},
    service::{missing_ids, reference_error, CategoryService, CreateImage, ImageService},
    store::{ListFilters, NewProduct, Page, Product, ProductChanges, ProductStore},
    upload::UploadedFile,
};
use std::sync::Arc;

/// Fields for a product create
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub category_ids: Vec<i64>,
    /// Uploaded image files, attached in order
    pub files: Vec<UploadedFile>,
    /// Optional per-file name overrides, paired positionally with `files`
    pub file_names: Vec<String>,
}

/// Partial fields for a product update
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enable: Option<bool>,
    pub category_ids: Option<Vec<i64>>,
    /// When present, the uploaded files become the product's image set
    pub files: Option<Vec<UploadedFile>>,
    pub file_names: Vec<String>,
}

#[derive(Clone)]
pub struct ProductService {
    products: ProductStore,
    categories: Arc<CategoryService>,
    images: Arc<ImageService>,
}

impl ProductService {
    pub fn new(
        products: ProductStore,
        categories: Arc<CategoryService>,
        images: Arc<ImageService>,
    ) -> Self {
        Self {
            products,
            categories,
            images,
        }
    }

    pub async fn list(&self, filters: &ListFilters) -> ApiResult<Page<Product>> {
        Ok(self.products.list(filters).await?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Product> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
    }

    /// Create a product: validate category references, persist every
    /// uploaded file as an Image, then write the product with the
    /// collected image ids
    pub async fn create(&self, data: CreateProduct) -> ApiResult<Product> {
        self.check_categories(&data.category_ids).await?;

        let image_ids = self.attach_images(data.files, &data.file_names).await?;

        Ok(self
            .products
            .create(NewProduct {
                name: data.name,
                description: data.description,
                category_ids: data.category_ids,
                image_ids,
            })
            .await?)
    }

    /// Update a product; present category ids are validated, present
    /// files become the new image set
    pub async fn update(&self, id: i64, data: UpdateProduct) -> ApiResult<Product> {
        self.get(id).await?;

        if let Some(category_ids) = &data.category_ids {
            self.check_categories(category_ids).await?;
        }

        let image_ids = match data.files {
            Some(files) => Some(self.attach_images(files, &data.file_names).await?),
            None => None,
        };

        Ok(self
            .products
            .update(
                id,
                ProductChanges {
                    name: data.name,
                    description: data.description,
                    enable: data.enable,
                    category_ids: data.category_ids,
                    image_ids,
                },
            )
            .await?)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.get(id).await?;
        Ok(self.products.delete(id).await?)
    }

    /// Referential check: an empty id list always validates
    async fn check_categories(&self, category_ids: &[i64]) -> ApiResult<()> {
        if category_ids.is_empty() {
            return Ok(());
        }

        let found: Vec<i64> = self
            .categories
            .get_by_ids(category_ids)
            .await?
            .iter()
            .map(|c| c.id)
            .collect();

        let missing = missing_ids(category_ids, &found);
        if !missing.is_empty() {
            return Err(reference_error("Category", &missing));
        }

        Ok(())
    }

    /// Persist each uploaded file as an Image row, in file order
    ///
    /// Names pair positionally with files, falling back to each file's own
    /// stem. The first failure aborts the whole product write; a partial
    /// image set is never attached silently.
    async fn attach_images(
        &self,
        files: Vec<UploadedFile>,
        file_names: &[String],
    ) -> ApiResult<Vec<i64>> {
        let mut image_ids = Vec::with_capacity(files.len());

        for (index, file) in files.into_iter().enumerate() {
            let name = file_names
                .get(index)
                .filter(|name| !name.is_empty())
                .cloned()
                .unwrap_or_else(|| file.stem().to_string());

            let image = self.images.create(CreateImage { name, file }).await?;
            image_ids.push(image.id);
        }

        Ok(image_ids)
    }
}
