/// Image persistence
///
/// Image rows are independent entities referenced by products through the
/// join table; the stored `file` key is the filename within the blob
/// store's image prefix, and the public URL is derived, not stored.
use crate::store::{order_clause, ListFilters, Page};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

const ORDERABLE: &[&str] = &["id", "name"];

/// Image row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub name: String,
    pub file: String,
    pub enable: bool,
}

/// Fields for an image create
#[derive(Debug, Clone)]
pub struct NewImage {
    pub name: String,
    pub file: String,
}

/// Partial fields for an image update; only present keys are applied
#[derive(Debug, Clone, Default)]
pub struct ImageChanges {
    pub name: Option<String>,
    pub file: Option<String>,
    pub enable: Option<bool>,
}

/// Image store over the SQLite pool
#[derive(Clone)]
pub struct ImageStore {
    pool: SqlitePool,
}

impl ImageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Enabled images, filtered and paginated; newest first by default
    pub async fn list(&self, filters: &ListFilters) -> Result<Page<Image>, sqlx::Error> {
        let name_like = filters.name.as_ref().map(|n| format!("%{}%", n));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM images WHERE enable = 1 AND (? IS NULL OR name LIKE ?)",
        )
        .bind(&name_like)
        .bind(&name_like)
        .fetch_one(&self.pool)
        .await?;

        // Images default to id DESC (newest first), unlike the other entities
        let order = if filters.order_by.is_none() && filters.order.is_none() {
            "id DESC".to_string()
        } else {
            order_clause(filters, ORDERABLE, "id")
        };

        let sql = format!(
            "SELECT id, name, file, enable FROM images \
             WHERE enable = 1 AND (? IS NULL OR name LIKE ?) \
             ORDER BY {} LIMIT ? OFFSET ?",
            order
        );
        let items: Vec<Image> = sqlx::query_as(&sql)
            .bind(&name_like)
            .bind(&name_like)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            page: filters.page(),
            limit: filters.limit(),
        })
    }

    /// Fetch by id regardless of the enable flag
    pub async fn get(&self, id: i64) -> Result<Option<Image>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, file, enable FROM images WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, data: NewImage) -> Result<Image, sqlx::Error> {
        let id = sqlx::query("INSERT INTO images (name, file, enable) VALUES (?, ?, 1)")
            .bind(&data.name)
            .bind(&data.file)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(&self, id: i64, changes: ImageChanges) -> Result<Image, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(name) = &changes.name {
            sqlx::query("UPDATE images SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(file) = &changes.file {
            sqlx::query("UPDATE images SET file = ? WHERE id = ?")
                .bind(file)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(enable) = changes.enable {
            sqlx::query("UPDATE images SET enable = ? WHERE id = ?")
                .bind(enable)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Hard delete; join rows cascade
    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = memory_pool().await;
        let store = ImageStore::new(pool);

        let image = store
            .create(NewImage {
                name: "logo".into(),
                file: "logo.png".into(),
            })
            .await
            .unwrap();

        assert_eq!(image.name, "logo");
        assert_eq!(image.file, "logo.png");
        assert!(image.enable);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = memory_pool().await;
        let store = ImageStore::new(pool);

        for name in ["first", "second", "third"] {
            store
                .create(NewImage {
                    name: name.into(),
                    file: format!("{}.png", name),
                })
                .await
                .unwrap();
        }

        let page = store.list(&ListFilters::default()).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_update_only_present_fields() {
        let pool = memory_pool().await;
        let store = ImageStore::new(pool);

        let image = store
            .create(NewImage {
                name: "banner".into(),
                file: "banner.png".into(),
            })
            .await
            .unwrap();

        let updated = store
            .update(
                image.id,
                ImageChanges {
                    file: Some("banner-v2.png".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "banner");
        assert_eq!(updated.file, "banner-v2.png");
    }

    #[tokio::test]
    async fn test_disabled_excluded_from_list() {
        let pool = memory_pool().await;
        let store = ImageStore::new(pool);

        let image = store
            .create(NewImage {
                name: "secret".into(),
                file: "secret.png".into(),
            })
            .await
            .unwrap();
        store
            .update(
                image.id,
                ImageChanges {
                    enable: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let page = store.list(&ListFilters::default()).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(store.get(image.id).await.unwrap().is_some());
    }
}
