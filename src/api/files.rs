/// Stored blob serving
///
/// Serves uploaded files from the blob store at the public path the
/// derived URLs point to.
use crate::{
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Build blob serving routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/files/*path", get(serve))
}

async fn serve(
    State(ctx): State<AppContext>,
    Path(path): Path<String>,
) -> ApiResult<Response> {
    let data = ctx
        .blobs
        .get(&path)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("File not found: {}", path)))?;

    Ok(([(header::CONTENT_TYPE, content_type(&path))], data).into_response())
}

/// Content type from the file extension; catalog uploads are images
fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type("images/a.png"), "image/png");
        assert_eq!(content_type("images/b.jpeg"), "image/jpeg");
        assert_eq!(content_type("images/c.svg"), "image/svg+xml");
        assert_eq!(content_type("images/noext"), "application/octet-stream");
    }
}
