/// Entity services
///
/// Orchestration between the HTTP layer and the stores: cross-entity
/// reference validation before relation syncs, the image upload
/// lifecycle, and typed not-found signaling.
pub mod category;
pub mod image;
pub mod product;

pub use category::{CategoryService, CreateCategory, UpdateCategory};
pub use image::{CreateImage, ImageService, UpdateImage};
pub use product::{CreateProduct, ProductService, UpdateProduct};

use crate::error::ApiError;

/// Ids in `submitted` that the reference lookup did not return
pub(crate) fn missing_ids(submitted: &[i64], found: &[i64]) -> Vec<i64> {
    submitted
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}

/// Validation error naming exactly the unresolvable ids
pub(crate) fn reference_error(entity: &str, missing: &[i64]) -> ApiError {
    let ids = missing
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    ApiError::InvalidReference(format!("{} with id {} not found", entity, ids))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ids() {
        assert_eq!(missing_ids(&[1, 2, 3], &[1, 3]), vec![2]);
        assert!(missing_ids(&[], &[]).is_empty());
        assert_eq!(missing_ids(&[5, 6], &[]), vec![5, 6]);
    }

    #[test]
    fn test_reference_error_message() {
        let err = reference_error("Product", &[99, 100]);
        assert_eq!(err.to_string(), "Product with id 99, 100 not found");
    }
}
