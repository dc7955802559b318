use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::{AdminGuard, AdminStatus},
    error::{ApiError, ApiResult, ErrorResponse},
    handlers::form::MultipartForm,
    models::{
        CandidateStatus, CreateVerifiedCandidateRequest, UpdateCandidateStatus, VerifiedCandidate,
        default_candidate_service,
    },
    storage::Folder,
    validation::{IdPath, ValidatedJson, validate_payload},
};

/// list_candidates
///
/// [Public Route] Approved candidates for anonymous callers. A valid admin token
/// widens the listing to every candidate regardless of status.
#[utoipa::path(
    get,
    path = "/api/verified-candidates",
    responses((status = 200, description = "Candidates", body = [VerifiedCandidate]))
)]
pub async fn list_candidates(
    AdminStatus(is_admin): AdminStatus,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VerifiedCandidate>>> {
    let candidates = if is_admin {
        state.repo.list_all_candidates().await?
    } else {
        state.repo.list_approved_candidates().await?
    };
    Ok(Json(candidates))
}

#[utoipa::path(
    post,
    path = "/api/verified-candidates",
    request_body = CreateVerifiedCandidateRequest,
    responses(
        (status = 201, description = "Created", body = VerifiedCandidate),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_candidate(
    _admin: AdminGuard,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateVerifiedCandidateRequest>,
) -> ApiResult<(StatusCode, Json<VerifiedCandidate>)> {
    let candidate = state.repo.create_candidate(payload).await?;
    tracing::info!(id = candidate.id, "verified candidate created");
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// upload_candidate
///
/// [Admin Route] Creates a candidate from a multipart form whose `image` part is
/// stored under the `candidates` folder.
#[utoipa::path(
    post,
    path = "/api/verified-candidates/upload",
    request_body(content_type = "multipart/form-data", description = "image file plus fullName, title, company, bio, service, status"),
    responses(
        (status = 201, description = "Created", body = VerifiedCandidate),
        (status = 400, description = "Missing image or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_candidate(
    _admin: AdminGuard,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<VerifiedCandidate>)> {
    let mut form = MultipartForm::parse(multipart).await?;
    let image = form
        .take_file(&["image"])
        .ok_or_else(|| ApiError::bad_request("No image uploaded"))?;

    let mut request = CreateVerifiedCandidateRequest {
        full_name: form.text("fullName"),
        title: form.text("title"),
        company: form.text("company"),
        bio: form.text("bio"),
        service: form
            .optional("service")
            .unwrap_or_else(default_candidate_service),
        image_url: None,
        status: form
            .parse_enum::<CandidateStatus>("status")?
            .unwrap_or_default(),
    };
    validate_payload(&request)?;

    let stored = state
        .storage
        .upload(image.data, &image.file_name, &image.content_type, Folder::Candidates)
        .await?;
    request.image_url = Some(stored.url);

    let candidate = state.repo.create_candidate(request).await?;
    tracing::info!(id = candidate.id, "verified candidate uploaded");
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    patch,
    path = "/api/verified-candidates/{id}",
    params(("id" = i32, Path, description = "Candidate ID")),
    request_body = UpdateCandidateStatus,
    responses(
        (status = 200, description = "Updated", body = VerifiedCandidate),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_candidate_status(
    _admin: AdminGuard,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateCandidateStatus>,
) -> ApiResult<Json<VerifiedCandidate>> {
    state
        .repo
        .update_candidate_status(id, payload.status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Candidate not found"))
}
