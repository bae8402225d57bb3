/// Category persistence
use crate::store::{order_clause, placeholders, ListFilters, Page};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, SqlitePool};
use std::collections::HashMap;

const ORDERABLE: &[&str] = &["id", "name"];

/// Category row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub enable: bool,
}

/// Category with its enabled products loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub enable: bool,
    pub products: Vec<ProductSummary>,
}

/// Product as embedded under a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Fields for a category create
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub product_ids: Vec<i64>,
}

/// Partial fields for a category update; only present keys are applied
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub enable: Option<bool>,
    pub product_ids: Option<Vec<i64>>,
}

/// Category store over the SQLite pool
#[derive(Clone)]
pub struct CategoryStore {
    pool: SqlitePool,
}

impl CategoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Enabled categories, filtered and paginated, with enabled products
    pub async fn list(&self, filters: &ListFilters) -> Result<Page<Category>, sqlx::Error> {
        let name_like = filters.name.as_ref().map(|n| format!("%{}%", n));

        let total: i64 = {
            let mut q = sqlx::query_scalar(
                "SELECT COUNT(*) FROM categories WHERE enable = 1 AND (? IS NULL OR name LIKE ?)",
            );
            q = q.bind(&name_like).bind(&name_like);
            q.fetch_one(&self.pool).await?
        };

        let sql = format!(
            "SELECT id, name, enable FROM categories \
             WHERE enable = 1 AND (? IS NULL OR name LIKE ?) \
             ORDER BY {} LIMIT ? OFFSET ?",
            order_clause(filters, ORDERABLE, "id")
        );
        let rows: Vec<CategoryRow> = sqlx::query_as(&sql)
            .bind(&name_like)
            .bind(&name_like)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = self.with_products(rows).await?;

        Ok(Page {
            items,
            total,
            page: filters.page(),
            limit: filters.limit(),
        })
    }

    /// Fetch by id regardless of the enable flag
    pub async fn get(&self, id: i64) -> Result<Option<Category>, sqlx::Error> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, enable FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(self.with_products(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Enabled categories among the given ids; the reference-validation lookup
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<CategoryRow>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, name, enable FROM categories WHERE id IN ({}) AND enable = 1",
            placeholders(ids.len())
        );
        let mut q = sqlx::query_as(&sql);
        for id in ids {
            q = q.bind(id);
        }
        q.fetch_all(&self.pool).await
    }

    /// Insert a category and sync its product links in one transaction
    pub async fn create(&self, data: NewCategory) -> Result<Category, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO categories (name, enable) VALUES (?, 1)")
            .bind(&data.name)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        sync_products(&mut tx, id, &data.product_ids).await?;

        tx.commit().await?;

        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply present fields and, when `product_ids` is present, replace the
    /// full product link set, all within one transaction
    pub async fn update(&self, id: i64, changes: CategoryChanges) -> Result<Category, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(name) = &changes.name {
            sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(enable) = changes.enable {
            sqlx::query("UPDATE categories SET enable = ? WHERE id = ?")
                .bind(enable)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(product_ids) = &changes.product_ids {
            sync_products(&mut tx, id, product_ids).await?;
        }

        tx.commit().await?;

        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Hard delete; join rows cascade
    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Attach enabled products to a batch of category rows
    async fn with_products(&self, rows: Vec<CategoryRow>) -> Result<Vec<Category>, sqlx::Error> {
        let mut categories: Vec<Category> = rows
            .into_iter()
            .map(|row| Category {
                id: row.id,
                name: row.name,
                enable: row.enable,
                products: Vec::new(),
            })
            .collect();

        if categories.is_empty() {
            return Ok(categories);
        }

        let ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
        let sql = format!(
            "SELECT cp.category_id, p.id, p.name, p.description \
             FROM category_products cp \
             JOIN products p ON p.id = cp.product_id \
             WHERE cp.category_id IN ({}) AND p.enable = 1 \
             ORDER BY p.id",
            placeholders(ids.len())
        );
        let mut q = sqlx::query(&sql);
        for id in &ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let mut by_category: HashMap<i64, Vec<ProductSummary>> = HashMap::new();
        for row in rows {
            by_category
                .entry(row.get("category_id"))
                .or_default()
                .push(ProductSummary {
                    id: row.get("id"),
                    name: row.get("name"),
                    description: row.get("description"),
                });
        }

        for category in &mut categories {
            if let Some(products) = by_category.remove(&category.id) {
                category.products = products;
            }
        }

        Ok(categories)
    }
}

/// Replace the category's product link set within the caller's transaction
async fn sync_products(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    category_id: i64,
    product_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM category_products WHERE category_id = ?")
        .bind(category_id)
        .execute(&mut **tx)
        .await?;

    for product_id in product_ids {
        sqlx::query("INSERT INTO category_products (category_id, product_id) VALUES (?, ?)")
            .bind(category_id)
            .bind(product_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;
    use crate::store::{NewProduct, ProductStore};

    async fn seed_product(pool: &SqlitePool, name: &str) -> i64 {
        ProductStore::new(pool.clone())
            .create(NewProduct {
                name: name.into(),
                description: format!("{} description", name),
                category_ids: vec![],
                image_ids: vec![],
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_with_product_links() {
        let pool = memory_pool().await;
        let store = CategoryStore::new(pool.clone());
        let p1 = seed_product(&pool, "chair").await;
        let p2 = seed_product(&pool, "table").await;

        let category = store
            .create(NewCategory {
                name: "furniture".into(),
                product_ids: vec![p1, p2],
            })
            .await
            .unwrap();

        assert_eq!(category.name, "furniture");
        assert!(category.enable);
        let linked: Vec<i64> = category.products.iter().map(|p| p.id).collect();
        assert_eq!(linked, vec![p1, p2]);
    }

    #[tokio::test]
    async fn test_sync_is_total_replacement() {
        let pool = memory_pool().await;
        let store = CategoryStore::new(pool.clone());
        let p1 = seed_product(&pool, "one").await;
        let p2 = seed_product(&pool, "two").await;
        let p3 = seed_product(&pool, "three").await;

        let category = store
            .create(NewCategory {
                name: "numbers".into(),
                product_ids: vec![p1, p2],
            })
            .await
            .unwrap();

        let updated = store
            .update(
                category.id,
                CategoryChanges {
                    product_ids: Some(vec![p2, p3]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let linked: Vec<i64> = updated.products.iter().map(|p| p.id).collect();
        assert_eq!(linked, vec![p2, p3]);
    }

    #[tokio::test]
    async fn test_rollback_on_bad_reference() {
        let pool = memory_pool().await;
        let store = CategoryStore::new(pool.clone());

        // FK violation in the sync step must roll back the entity insert too
        let result = store
            .create(NewCategory {
                name: "doomed".into(),
                product_ids: vec![4242],
            })
            .await;
        assert!(result.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_list_excludes_disabled() {
        let pool = memory_pool().await;
        let store = CategoryStore::new(pool.clone());

        let visible = store
            .create(NewCategory {
                name: "visible".into(),
                product_ids: vec![],
            })
            .await
            .unwrap();
        let hidden = store
            .create(NewCategory {
                name: "hidden".into(),
                product_ids: vec![],
            })
            .await
            .unwrap();
        store
            .update(
                hidden.id,
                CategoryChanges {
                    enable: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let page = store.list(&ListFilters::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, visible.id);

        // get() still returns disabled rows
        assert!(store.get(hidden.id).await.unwrap().is_some());
        // but the reference lookup does not
        assert!(store.get_by_ids(&[hidden.id]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_name_filter_and_order() {
        let pool = memory_pool().await;
        let store = CategoryStore::new(pool.clone());
        for name in ["alpha", "beta", "alphabet"] {
            store
                .create(NewCategory {
                    name: name.into(),
                    product_ids: vec![],
                })
                .await
                .unwrap();
        }

        let filters = ListFilters {
            name: Some("alpha".into()),
            order_by: Some("name".into()),
            order: Some("desc".into()),
            ..Default::default()
        };
        let page = store.list(&filters).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alphabet", "alpha"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_join_rows() {
        let pool = memory_pool().await;
        let store = CategoryStore::new(pool.clone());
        let p1 = seed_product(&pool, "widget").await;

        let category = store
            .create(NewCategory {
                name: "widgets".into(),
                product_ids: vec![p1],
            })
            .await
            .unwrap();

        store.delete(category.id).await.unwrap();

        assert!(store.get(category.id).await.unwrap().is_none());
        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category_products")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }
}
