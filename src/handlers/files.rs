use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::{
    error::{ApiResult, ErrorResponse},
    storage::{CACHE_CONTROL, MediaStorage},
};

/// serve_object
///
/// [Public Route] Streams a stored object back to the client with its recorded
/// content type and a one-year cache directive. The body is never buffered whole.
///
/// Unknown folders and missing objects are 404; a missing bucket is 500.
#[utoipa::path(
    get,
    path = "/storage/{folder}/{filename}",
    params(
        ("folder" = String, Path, description = "One of uploads, content, candidates, templates, applications"),
        ("filename" = String, Path, description = "Generated object filename")
    ),
    responses(
        (status = 200, description = "Object bytes"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn serve_object(
    State(storage): State<MediaStorage>,
    Path((folder, filename)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let object = storage.open(&folder, &filename).await?;
    tracing::debug!(folder = %folder, filename = %filename, size = object.size, "streaming object");

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CONTENT_LENGTH, object.size.to_string()),
            (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
        ],
        Body::from_stream(object.body),
    ))
}
