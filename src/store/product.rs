/// Product persistence
use crate::store::{order_clause, placeholders, ListFilters, Page};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, SqlitePool};
use std::collections::HashMap;

const ORDERABLE: &[&str] = &["id", "name", "description"];

/// Product row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub enable: bool,
}

/// Product with its enabled categories loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub enable: bool,
    pub categories: Vec<CategorySummary>,
}

/// Category as embedded under a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
}

/// Fields for a product create
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category_ids: Vec<i64>,
    pub image_ids: Vec<i64>,
}

/// Partial fields for a product update; only present keys are applied
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enable: Option<bool>,
    pub category_ids: Option<Vec<i64>>,
    pub image_ids: Option<Vec<i64>>,
}

/// Product store over the SQLite pool
#[derive(Clone)]
pub struct ProductStore {
    pool: SqlitePool,
}

impl ProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Enabled products, filtered and paginated, with enabled categories
    pub async fn list(&self, filters: &ListFilters) -> Result<Page<Product>, sqlx::Error> {
        let name_like = filters.name.as_ref().map(|n| format!("%{}%", n));
        let desc_like = filters.description.as_ref().map(|d| format!("%{}%", d));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE enable = 1 \
             AND (? IS NULL OR name LIKE ?) \
             AND (? IS NULL OR description LIKE ?)",
        )
        .bind(&name_like)
        .bind(&name_like)
        .bind(&desc_like)
        .bind(&desc_like)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT id, name, description, enable FROM products \
             WHERE enable = 1 \
             AND (? IS NULL OR name LIKE ?) \
             AND (? IS NULL OR description LIKE ?) \
             ORDER BY {} LIMIT ? OFFSET ?",
            order_clause(filters, ORDERABLE, "id")
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(&name_like)
            .bind(&name_like)
            .bind(&desc_like)
            .bind(&desc_like)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = self.with_categories(rows).await?;

        Ok(Page {
            items,
            total,
            page: filters.page(),
            limit: filters.limit(),
        })
    }

    /// Fetch by id regardless of the enable flag
    pub async fn get(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        let row: Option<ProductRow> =
            sqlx::query_as("SELECT id, name, description, enable FROM products WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(self.with_categories(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Enabled products among the given ids; the reference-validation lookup
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, name, description, enable FROM products \
             WHERE id IN ({}) AND enable = 1",
            placeholders(ids.len())
        );
        let mut q = sqlx::query_as(&sql);
        for id in ids {
            q = q.bind(id);
        }
        q.fetch_all(&self.pool).await
    }

    /// Insert a product and sync both link sets in one transaction
    pub async fn create(&self, data: NewProduct) -> Result<Product, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO products (name, description, enable) VALUES (?, ?, 1)")
            .bind(&data.name)
            .bind(&data.description)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        sync_categories(&mut tx, id, &data.category_ids).await?;
        sync_images(&mut tx, id, &data.image_ids).await?;

        tx.commit().await?;

        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply present fields; present relation-id lists replace their full
    /// link sets, all within one transaction
    pub async fn update(&self, id: i64, changes: ProductChanges) -> Result<Product, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(name) = &changes.name {
            sqlx::query("UPDATE products SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(description) = &changes.description {
            sqlx::query("UPDATE products SET description = ? WHERE id = ?")
                .bind(description)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(enable) = changes.enable {
            sqlx::query("UPDATE products SET enable = ? WHERE id = ?")
                .bind(enable)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(category_ids) = &changes.category_ids {
            sync_categories(&mut tx, id, category_ids).await?;
        }
        if let Some(image_ids) = &changes.image_ids {
            sync_images(&mut tx, id, image_ids).await?;
        }

        tx.commit().await?;

        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Hard delete; join rows cascade, image rows stay
    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Image ids currently linked to a product
    pub async fn image_ids(&self, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT image_id FROM product_images WHERE product_id = ? ORDER BY image_id")
            .bind(id)
            .fetch_all(&self.pool)
            .await
    }

    /// Attach enabled categories to a batch of product rows
    async fn with_categories(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, sqlx::Error> {
        let mut products: Vec<Product> = rows
            .into_iter()
            .map(|row| Product {
                id: row.id,
                name: row.name,
                description: row.description,
                enable: row.enable,
                categories: Vec::new(),
            })
            .collect();

        if products.is_empty() {
            return Ok(products);
        }

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let sql = format!(
            "SELECT cp.product_id, c.id, c.name \
             FROM category_products cp \
             JOIN categories c ON c.id = cp.category_id \
             WHERE cp.product_id IN ({}) AND c.enable = 1 \
             ORDER BY c.id",
            placeholders(ids.len())
        );
        let mut q = sqlx::query(&sql);
        for id in &ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let mut by_product: HashMap<i64, Vec<CategorySummary>> = HashMap::new();
        for row in rows {
            by_product
                .entry(row.get("product_id"))
                .or_default()
                .push(CategorySummary {
                    id: row.get("id"),
                    name: row.get("name"),
                });
        }

        for product in &mut products {
            if let Some(categories) = by_product.remove(&product.id) {
                product.categories = categories;
            }
        }

        Ok(products)
    }
}

/// Replace the product's category link set within the caller's transaction
async fn sync_categories(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM category_products WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

    for category_id in category_ids {
        sqlx::query("INSERT INTO category_products (category_id, product_id) VALUES (?, ?)")
            .bind(category_id)
            .bind(product_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Replace the product's image link set within the caller's transaction
async fn sync_images(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: i64,
    image_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_images WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

    for image_id in image_ids {
        sqlx::query("INSERT INTO product_images (product_id, image_id) VALUES (?, ?)")
            .bind(product_id)
            .bind(image_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
