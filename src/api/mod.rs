/// HTTP API
///
/// Thin adapters from wire requests to service calls and back to the
/// JSON envelope. One module per entity plus blob serving.
pub mod category;
pub mod files;
pub mod image;
pub mod product;
pub mod response;

use crate::{
    context::AppContext,
    error::{ApiError, ApiResult},
    store::ListFilters,
};
use axum::Router;
use serde::Deserialize;
use validator::Validate;

/// Build all API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(category::routes())
        .merge(product::routes())
        .merge(image::routes())
        .merge(files::routes())
}

/// Common list query parameters
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListParams {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub order_by: Option<String>,
    pub order: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
}

impl ListParams {
    /// Validate and convert into store filters
    pub fn into_filters(self) -> ApiResult<ListFilters> {
        self.validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(ListFilters {
            name: self.name,
            description: self.description,
            order_by: self.order_by,
            order: self.order,
            limit: self.limit,
            page: self.page,
        })
    }
}

/// Parse a multipart text field as an id
pub(crate) fn parse_id(field: &str, value: &str) -> ApiResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("{} must be an integer id", field)))
}

/// Parse a multipart text field as a boolean
pub(crate) fn parse_bool(field: &str, value: &str) -> ApiResult<bool> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ApiError::Validation(format!(
            "{} must be a boolean",
            field
        ))),
    }
}

/// Require a non-empty field within the 255-char catalog name limit
pub(crate) fn require_name(field: &str, value: Option<String>) -> ApiResult<String> {
    let value = value.ok_or_else(|| ApiError::Validation(format!("{} is required", field)))?;
    check_name(field, &value)?;
    Ok(value)
}

pub(crate) fn check_name(field: &str, value: &str) -> ApiResult<()> {
    if value.is_empty() || value.len() > 255 {
        return Err(ApiError::Validation(format!(
            "{} must be between 1 and 255 characters",
            field
        )));
    }
    Ok(())
}
