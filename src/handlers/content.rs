use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::AdminGuard,
    error::{ApiError, ApiResult, ErrorResponse},
    handlers::form::MultipartForm,
    models::{
        ContentItem, CreateContentItemRequest, UpdateContentItemRequest, default_content_type,
    },
    storage::Folder,
    validation::{IdPath, ValidatedJson, validate_payload},
};

/// ContentFilter
///
/// Query parameters for the public content listing (`GET /api/content`).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ContentFilter {
    /// Optional exact match on the item type (e.g. `news`, `video`).
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

/// list_content
///
/// [Public Route] Published content items, newest first.
#[utoipa::path(
    get,
    path = "/api/content",
    params(ContentFilter),
    responses((status = 200, description = "Published content", body = [ContentItem]))
)]
pub async fn list_content(
    State(state): State<AppState>,
    Query(filter): Query<ContentFilter>,
) -> ApiResult<Json<Vec<ContentItem>>> {
    let content_type = filter.content_type.filter(|t| !t.is_empty());
    Ok(Json(state.repo.list_published_content(content_type).await?))
}

/// create_content
///
/// [Admin Route] Creates an item whose media is already hosted (no upload).
#[utoipa::path(
    post,
    path = "/api/content",
    request_body = CreateContentItemRequest,
    responses(
        (status = 201, description = "Created", body = ContentItem),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_content(
    _admin: AdminGuard,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateContentItemRequest>,
) -> ApiResult<(StatusCode, Json<ContentItem>)> {
    let item = state.repo.create_content_item(payload).await?;
    tracing::info!(id = item.id, "content item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// upload_content
///
/// [Admin Route] Multipart upload of an `image` or `video` plus the item's text
/// fields. The stored object's public path becomes `url`, and also `imageUrl` for
/// news items or `fileUrl` for everything else.
#[utoipa::path(
    post,
    path = "/api/content/upload",
    request_body(content_type = "multipart/form-data", description = "image or video file plus title, description, type, category, isFavourite, isPublished"),
    responses(
        (status = 201, description = "Created", body = ContentItem),
        (status = 400, description = "Missing file or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_content(
    _admin: AdminGuard,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ContentItem>)> {
    let mut form = MultipartForm::parse(multipart).await?;
    let file = form
        .take_file(&["image", "video"])
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let mut request = CreateContentItemRequest {
        content_type: form.optional("type").unwrap_or_else(default_content_type),
        title: form.text("title"),
        description: form.text("description"),
        // Placeholder until the object is stored; validation only needs it non-empty.
        url: file.file_name.clone(),
        category: form.optional("category"),
        is_favourite: form.flag("isFavourite"),
        is_published: form.flag("isPublished"),
        ..Default::default()
    };
    validate_payload(&request)?;

    let stored = state
        .storage
        .upload(file.data, &file.file_name, &file.content_type, Folder::Content)
        .await?;

    if request.content_type == "news" {
        request.image_url = Some(stored.url.clone());
    } else {
        request.file_url = Some(stored.url.clone());
    }
    request.url = stored.url;
    request.filename = Some(stored.filename);

    let item = state.repo.create_content_item(request).await?;
    tracing::info!(id = item.id, url = %item.url, "content item uploaded");
    Ok((StatusCode::CREATED, Json(item)))
}

/// update_content
///
/// [Admin Route] Partial update; omitted fields keep their stored values.
#[utoipa::path(
    patch,
    path = "/api/content/{id}",
    params(("id" = i32, Path, description = "Content item ID")),
    request_body = UpdateContentItemRequest,
    responses(
        (status = 200, description = "Updated", body = ContentItem),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_content(
    _admin: AdminGuard,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateContentItemRequest>,
) -> ApiResult<Json<ContentItem>> {
    state
        .repo
        .update_content_item(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Content not found"))
}

/// delete_content
///
/// [Admin Route] Removes the row, then best-effort deletes every stored object it
/// referenced. Object cleanup failures never fail the request.
#[utoipa::path(
    delete,
    path = "/api/content/{id}",
    params(("id" = i32, Path, description = "Content item ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_content(
    _admin: AdminGuard,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    let item = state
        .repo
        .delete_content_item(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;

    let mut paths: Vec<String> = [Some(item.url), item.image_url, item.file_url]
        .into_iter()
        .flatten()
        .collect();
    paths.sort();
    paths.dedup();
    for path in paths {
        state.storage.delete(&path).await;
    }

    tracing::info!(id, "content item deleted");
    Ok(StatusCode::NO_CONTENT)
}
