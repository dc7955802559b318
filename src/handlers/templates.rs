use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AdminGuard,
    error::{ApiError, ApiResult, ErrorResponse},
    handlers::form::MultipartForm,
    models::{NewTemplate, Template, TemplateFileType, TemplateUploadForm, UpdateTemplateStatus},
    storage::{Folder, file_extension},
    validation::{IdPath, ValidatedJson, validate_payload},
};

/// list_templates
///
/// [Public Route] Published templates only.
#[utoipa::path(
    get,
    path = "/api/templates",
    responses((status = 200, description = "Published templates", body = [Template]))
)]
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(state.repo.list_published_templates().await?))
}

/// list_all_templates
///
/// [Admin Route] Every template, published or not.
#[utoipa::path(
    get,
    path = "/api/templates/all",
    responses(
        (status = 200, description = "All templates", body = [Template]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_all_templates(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(state.repo.list_all_templates().await?))
}

/// resolve_file_type
///
/// An explicit `fileType` field wins; otherwise the type is read off the uploaded
/// file's extension. Anything else is a validation failure on `fileType`.
fn resolve_file_type(explicit: Option<&str>, file_name: &str) -> ApiResult<TemplateFileType> {
    let resolved = match explicit {
        Some(value) => TemplateFileType::parse(value),
        None => TemplateFileType::from_extension(file_extension(file_name)),
    };
    resolved.ok_or_else(|| ApiError::Validation {
        message: "File type must be one of pdf, docx, xlsx".to_string(),
        field: Some("fileType".to_string()),
    })
}

/// upload_template
///
/// [Admin Route] Stores the multipart `file` part under `templates` and records it.
#[utoipa::path(
    post,
    path = "/api/templates/upload",
    request_body(content_type = "multipart/form-data", description = "file plus title, description, fileType, isPublished"),
    responses(
        (status = 201, description = "Created", body = Template),
        (status = 400, description = "Missing file or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_template(
    _admin: AdminGuard,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Template>)> {
    let mut form = MultipartForm::parse(multipart).await?;
    let file = form
        .take_file(&["file"])
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let fields = TemplateUploadForm {
        title: form.text("title"),
        description: form.text("description"),
        file_type: form.optional("fileType"),
        is_published: form.flag("isPublished"),
    };
    validate_payload(&fields)?;
    let file_type = resolve_file_type(fields.file_type.as_deref(), &file.file_name)?;

    let stored = state
        .storage
        .upload(file.data, &file.file_name, &file.content_type, Folder::Templates)
        .await?;

    let template = state
        .repo
        .create_template(NewTemplate {
            title: fields.title,
            description: fields.description,
            filename: stored.filename,
            file_url: stored.url,
            file_type,
            is_published: fields.is_published,
        })
        .await?;

    tracing::info!(id = template.id, file_type = ?template.file_type, "template uploaded");
    Ok((StatusCode::CREATED, Json(template)))
}

#[utoipa::path(
    patch,
    path = "/api/templates/{id}",
    params(("id" = i32, Path, description = "Template ID")),
    request_body = UpdateTemplateStatus,
    responses(
        (status = 200, description = "Updated", body = Template),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_template_status(
    _admin: AdminGuard,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateTemplateStatus>,
) -> ApiResult<Json<Template>> {
    state
        .repo
        .set_template_published(id, payload.is_published)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Template not found"))
}

/// delete_template
///
/// [Admin Route] Removes the row, then the stored file (best-effort).
#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    params(("id" = i32, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_template(
    _admin: AdminGuard,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    let template = state
        .repo
        .delete_template(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;

    state.storage.delete(&template.file_url).await;
    tracing::info!(id, "template deleted");
    Ok(StatusCode::NO_CONTENT)
}
