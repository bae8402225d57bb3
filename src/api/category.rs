/// Category endpoints
use crate::{
    api::{
        response::{ApiResponse, Pagination},
        ListParams,
    },
    context::AppContext,
    error::{ApiError, ApiResult},
    service::{CreateCategory, UpdateCategory},
    store::{category::ProductSummary, Category},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Build category routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/v1/category", get(index).post(store))
        .route(
            "/v1/category/:id",
            get(show).put(update).delete(destroy),
        )
}

/// Category as serialized to clients; `enable` only on single fetches
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    pub products: Vec<ProductSummary>,
}

impl CategoryView {
    fn collection(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            enable: None,
            products: category.products,
        }
    }

    fn single(category: Category) -> Self {
        Self {
            enable: Some(category.enable),
            ..Self::collection(category)
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub product_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub enable: Option<bool>,
    pub product_ids: Option<Vec<i64>>,
}

async fn index(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let filters = params.into_filters()?;
    let page = ctx.categories.list(&filters).await?;

    let pagination = Pagination::of(&page);
    let data: Vec<CategoryView> = page.items.into_iter().map(CategoryView::collection).collect();

    Ok(ApiResponse::paginated(data, pagination))
}

async fn show(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let category = ctx.categories.get(id).await?;
    Ok(ApiResponse::success(CategoryView::single(category)))
}

async fn store(
    State(ctx): State<AppContext>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let category = ctx
        .categories
        .create(CreateCategory {
            name: payload.name,
            product_ids: payload.product_ids,
        })
        .await?;

    Ok(ApiResponse::success(CategoryView::single(category)))
}

async fn update(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let category = ctx
        .categories
        .update(
            id,
            UpdateCategory {
                name: payload.name,
                enable: payload.enable,
                product_ids: payload.product_ids,
            },
        )
        .await?;

    Ok(ApiResponse::success(CategoryView::single(category)))
}

async fn destroy(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    ctx.categories.delete(id).await?;
    Ok(ApiResponse::success(serde_json::json!(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_view_hides_enable() {
        let category = Category {
            id: 1,
            name: "a".into(),
            enable: true,
            products: vec![],
        };

        let value = serde_json::to_value(CategoryView::collection(category.clone())).unwrap();
        assert!(value.get("enable").is_none());

        let value = serde_json::to_value(CategoryView::single(category)).unwrap();
        assert_eq!(value["enable"], true);
    }
}
