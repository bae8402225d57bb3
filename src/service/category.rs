/// Category service
use crate::{
    error::{ApiError, ApiResult},
    service::{missing_ids, reference_error},
    store::{
        category::CategoryRow, Category, CategoryChanges, CategoryStore, ListFilters, NewCategory,
        Page, ProductStore,
    },
};

/// Fields for a category create
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub product_ids: Vec<i64>,
}

/// Partial fields for a category update
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub enable: Option<bool>,
    pub product_ids: Option<Vec<i64>>,
}

/// Category service: validates product references before any relation sync
#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryStore,
    products: ProductStore,
}

impl CategoryService {
    pub fn new(categories: CategoryStore, products: ProductStore) -> Self {
        Self {
            categories,
            products,
        }
    }

    pub async fn list(&self, filters: &ListFilters) -> ApiResult<Page<Category>> {
        Ok(self.categories.list(filters).await?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Category> {
        self.categories
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
    }

    /// Create a category after verifying every submitted product id
    /// resolves to an enabled product
    pub async fn create(&self, data: CreateCategory) -> ApiResult<Category> {
        self.check_products(&data.product_ids).await?;

        Ok(self
            .categories
            .create(NewCategory {
                name: data.name,
                product_ids: data.product_ids,
            })
            .await?)
    }

    /// Update a category; a present `product_ids` list is validated and
    /// then replaces the full link set
    pub async fn update(&self, id: i64, data: UpdateCategory) -> ApiResult<Category> {
        self.get(id).await?;

        if let Some(product_ids) = &data.product_ids {
            self.check_products(product_ids).await?;
        }

        Ok(self
            .categories
            .update(
                id,
                CategoryChanges {
                    name: data.name,
                    enable: data.enable,
                    product_ids: data.product_ids,
                },
            )
            .await?)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.get(id).await?;
        Ok(self.categories.delete(id).await?)
    }

    /// Enabled categories among the given ids (used by the product side's
    /// reference validation)
    pub async fn get_by_ids(&self, ids: &[i64]) -> ApiResult<Vec<CategoryRow>> {
        Ok(self.categories.get_by_ids(ids).await?)
    }

    /// Referential check: an empty id list always validates
    async fn check_products(&self, product_ids: &[i64]) -> ApiResult<()> {
        if product_ids.is_empty() {
            return Ok(());
        }

        let found: Vec<i64> = self
            .products
            .get_by_ids(product_ids)
            .await?
            .iter()
            .map(|p| p.id)
            .collect();

        let missing = missing_ids(product_ids, &found);
        if !missing.is_empty() {
            return Err(reference_error("Product", &missing));
        }

        Ok(())
    }
}
