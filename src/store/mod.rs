/// Persistence layer for catalog entities
///
/// Each store maps one entity onto the SQLite pool. Writes that touch a
/// relation-id list sync the join table to exactly that set inside the
/// same transaction as the entity write; errors bubble as `sqlx::Error`.
pub mod category;
pub mod image;
pub mod product;

pub use category::{Category, CategoryChanges, CategoryStore, NewCategory};
pub use image::{Image, ImageChanges, ImageStore, NewImage};
pub use product::{Product, ProductChanges, ProductStore, NewProduct};

/// Filters shared by the list operations
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub name: Option<String>,
    pub description: Option<String>,
    pub order_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ListFilters {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).max(1)
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Row offset for the requested page; widened so an extreme `page`
    /// cannot overflow
    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.limit() as i64
    }
}

/// One page of list results plus the counts pagination is built from
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.limit as i64 - 1) / self.limit as i64
        }
    }
}

/// ORDER BY clause from a whitelisted column and direction
///
/// Unknown columns fall back to `id` rather than erroring; direction is
/// anything-but-desc = ASC.
pub(crate) fn order_clause(filters: &ListFilters, allowed: &[&str], default: &str) -> String {
    let col = filters
        .order_by
        .as_deref()
        .filter(|c| allowed.contains(c))
        .unwrap_or(default);
    let dir = match filters.order.as_deref() {
        Some(o) if o.eq_ignore_ascii_case("desc") => "DESC",
        _ => "ASC",
    };
    format!("{} {}", col, dir)
}

/// `?, ?, ?` placeholder list for IN clauses
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_whitelist() {
        let mut filters = ListFilters::default();
        assert_eq!(order_clause(&filters, &["id", "name"], "id"), "id ASC");

        filters.order_by = Some("name".into());
        filters.order = Some("DESC".into());
        assert_eq!(order_clause(&filters, &["id", "name"], "id"), "name DESC");

        // Injection attempt falls back to the default column
        filters.order_by = Some("name; DROP TABLE categories".into());
        assert_eq!(order_clause(&filters, &["id", "name"], "id"), "id DESC");
    }

    #[test]
    fn test_page_math() {
        let page = Page::<i64> {
            items: vec![],
            total: 21,
            page: 1,
            limit: 10,
        };
        assert_eq!(page.total_pages(), 3);

        let empty = Page::<i64> {
            items: vec![],
            total: 0,
            page: 1,
            limit: 10,
        };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_filters_defaults() {
        let filters = ListFilters::default();
        assert_eq!(filters.limit(), 10);
        assert_eq!(filters.page(), 1);
        assert_eq!(filters.offset(), 0);

        let filters = ListFilters {
            limit: Some(5),
            page: Some(3),
            ..Default::default()
        };
        assert_eq!(filters.offset(), 10);

        // An extreme page must not overflow the offset math
        let filters = ListFilters {
            limit: Some(100),
            page: Some(u32::MAX),
            ..Default::default()
        };
        assert_eq!(filters.offset(), (u32::MAX as i64 - 1) * 100);
    }
}
