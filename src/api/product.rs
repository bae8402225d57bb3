/// Product endpoints
///
/// Create and update accept multipart bodies so image files can ride
/// along with the entity fields: `name`, `description`, repeated
/// `category_ids`, repeated `files`, repeated `file_name`, `enable`.
use crate::{
    api::{
        check_name, parse_bool, parse_id, require_name,
        response::{ApiResponse, Pagination},
        ListParams,
    },
    context::AppContext,
    error::{ApiError, ApiResult},
    service::{CreateProduct, UpdateProduct},
    store::{product::CategorySummary, Product},
    upload::UploadedFile,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Serialize;

/// Build product routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/v1/product", get(index).post(store))
        .route("/v1/product/:id", get(show).put(update).delete(destroy))
}

/// Product as serialized to clients; `enable` only on single fetches
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    pub categories: Vec<CategorySummary>,
}

impl ProductView {
    fn collection(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            enable: None,
            categories: product.categories,
        }
    }

    fn single(product: Product) -> Self {
        Self {
            enable: Some(product.enable),
            ..Self::collection(product)
        }
    }
}

/// Multipart fields accepted by create and update
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    enable: Option<bool>,
    category_ids: Option<Vec<i64>>,
    files: Vec<UploadedFile>,
    file_names: Vec<String>,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => {
                form.name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                )
            }
            "description" => {
                form.description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                )
            }
            "enable" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                form.enable = Some(parse_bool("enable", &text)?);
            }
            // Repeated field; its mere presence means "sync this set",
            // so an empty value registers an empty list
            "category_ids" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                let ids = form.category_ids.get_or_insert_with(Vec::new);
                if !text.trim().is_empty() {
                    ids.push(parse_id("category_ids", &text)?);
                }
            }
            "files" => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                form.files.push(UploadedFile::new(original_name, bytes.to_vec()));
            }
            "file_name" => {
                form.file_names.push(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn index(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let filters = params.into_filters()?;
    let page = ctx.products.list(&filters).await?;

    let pagination = Pagination::of(&page);
    let data: Vec<ProductView> = page.items.into_iter().map(ProductView::collection).collect();

    Ok(ApiResponse::paginated(data, pagination))
}

async fn show(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let product = ctx.products.get(id).await?;
    Ok(ApiResponse::success(ProductView::single(product)))
}

async fn store(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_form(multipart).await?;

    let name = require_name("name", form.name)?;
    let description = require_name("description", form.description)?;
    let category_ids = form
        .category_ids
        .ok_or_else(|| ApiError::Validation("category_ids is required".to_string()))?;

    let product = ctx
        .products
        .create(CreateProduct {
            name,
            description,
            category_ids,
            files: form.files,
            file_names: form.file_names,
        })
        .await?;

    Ok(ApiResponse::success(ProductView::single(product)))
}

async fn update(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_form(multipart).await?;

    if let Some(name) = &form.name {
        check_name("name", name)?;
    }
    if let Some(description) = &form.description {
        check_name("description", description)?;
    }

    let files = if form.files.is_empty() {
        None
    } else {
        Some(form.files)
    };

    let product = ctx
        .products
        .update(
            id,
            UpdateProduct {
                name: form.name,
                description: form.description,
                enable: form.enable,
                category_ids: form.category_ids,
                files,
                file_names: form.file_names,
            },
        )
        .await?;

    Ok(ApiResponse::success(ProductView::single(product)))
}

async fn destroy(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    ctx.products.delete(id).await?;
    Ok(ApiResponse::success(serde_json::json!(true)))
}
