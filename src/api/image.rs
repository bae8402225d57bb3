/// Image endpoints
///
/// Create and update accept multipart bodies (`name`, `file`, `enable`);
/// the stored file key and derived public URL come back in the view.
use crate::{
    api::{
        check_name, parse_bool, require_name,
        response::{ApiResponse, Pagination},
        ListParams,
    },
    context::AppContext,
    error::{ApiError, ApiResult},
    service::{CreateImage, UpdateImage},
    store::Image,
    upload::UploadedFile,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Serialize;

/// Build image routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/v1/image", get(index).post(store))
        .route("/v1/image/:id", get(show).put(update).delete(destroy))
}

/// Image as serialized to clients; `enable` only on single fetches
#[derive(Debug, Serialize)]
pub struct ImageView {
    pub id: i64,
    pub name: String,
    pub file: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
}

impl ImageView {
    fn collection(ctx: &AppContext, image: Image) -> Self {
        Self {
            id: image.id,
            url: ctx.images.url_for(&image),
            name: image.name,
            file: image.file,
            enable: None,
        }
    }

    fn single(ctx: &AppContext, image: Image) -> Self {
        Self {
            enable: Some(image.enable),
            ..Self::collection(ctx, image)
        }
    }
}

/// Multipart fields accepted by create and update
#[derive(Debug, Default)]
struct ImageForm {
    name: Option<String>,
    enable: Option<bool>,
    file: Option<UploadedFile>,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<ImageForm> {
    let mut form = ImageForm::default();

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
            "enable" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                form.enable = Some(parse_bool("enable", &text)?);
            }
            "file" => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                form.file = Some(UploadedFile::new(original_name, bytes.to_vec()));
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
    let page = ctx.images.list(&filters).await?;

    let pagination = Pagination::of(&page);
    let data: Vec<ImageView> = page
        .items
        .into_iter()
        .map(|image| ImageView::collection(&ctx, image))
        .collect();

    Ok(ApiResponse::paginated(data, pagination))
}

async fn show(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let image = ctx.images.get(id).await?;
    Ok(ApiResponse::success(ImageView::single(&ctx, image)))
}

async fn store(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_form(multipart).await?;

    let name = require_name("name", form.name)?;
    let file = form
        .file
        .ok_or_else(|| ApiError::Validation("file is required".to_string()))?;

    let image = ctx.images.create(CreateImage { name, file }).await?;

    Ok(ApiResponse::success(ImageView::single(&ctx, image)))
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

    let image = ctx
        .images
        .update(
            id,
            UpdateImage {
                name: form.name,
                enable: form.enable,
                file: form.file,
            },
        )
        .await?;

    Ok(ApiResponse::success(ImageView::single(&ctx, image)))
}

async fn destroy(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    ctx.images.delete(id).await?;
    Ok(ApiResponse::success(serde_json::json!(true)))
}
