use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{ApiError, ApiResult, ErrorResponse},
    handlers::form::MultipartForm,
    models::{CreateJobRequest, JobApplication, JobApplicationForm, JobPosting, UpdateJobRequest},
    storage::Folder,
    validation::{IdPath, ValidatedJson, validate_payload},
};

fn job_not_found() -> ApiError {
    ApiError::not_found("Job not found")
}

// --- Public ---

/// list_jobs
///
/// [Public Route] Published job postings only.
#[utoipa::path(
    get,
    path = "/api/jobs",
    responses((status = 200, description = "Published jobs", body = [JobPosting]))
)]
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobPosting>>> {
    Ok(Json(state.repo.list_published_jobs().await?))
}

/// get_job
///
/// [Public Route] A single posting by id, published or not.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job", body = JobPosting),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<JobPosting>> {
    state.repo.get_job(id).await?.map(Json).ok_or_else(job_not_found)
}

/// Reads the numeric `jobId` text field.
fn parse_job_id(form: &MultipartForm) -> ApiResult<i32> {
    form.text("jobId")
        .trim()
        .parse::<i32>()
        .map_err(|_| ApiError::Validation {
            message: "Invalid job id".to_string(),
            field: Some("jobId".to_string()),
        })
}

/// apply_for_job
///
/// [Public Route] Multipart job application with the CV in the `cv` part.
///
/// Order matters: the form is validated and the job is looked up before the CV
/// is written, so a rejected application never leaves an object behind.
#[utoipa::path(
    post,
    path = "/api/jobs/apply",
    request_body(content_type = "multipart/form-data", description = "cv file plus jobId, fullName, email, phone, state, city, coverNote"),
    responses(
        (status = 201, description = "Application received", body = JobApplication),
        (status = 400, description = "Missing CV or invalid input", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn apply_for_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<JobApplication>)> {
    let mut form = MultipartForm::parse(multipart).await?;
    let cv = form
        .take_file(&["cv"])
        .ok_or_else(|| ApiError::bad_request("CV is required"))?;

    let application = JobApplicationForm {
        job_id: parse_job_id(&form)?,
        full_name: form.text("fullName"),
        email: form.text("email"),
        phone: form.text("phone"),
        state: form.text("state"),
        city: form.text("city"),
        cover_note: form.text("coverNote"),
    };
    validate_payload(&application)?;

    if state.repo.get_job(application.job_id).await?.is_none() {
        return Err(job_not_found());
    }

    let stored = state
        .storage
        .upload(cv.data, &cv.file_name, &cv.content_type, Folder::Applications)
        .await?;

    let created = state
        .repo
        .create_job_application(application.into_application(stored.filename, stored.url))
        .await?;

    tracing::info!(id = created.id, job_id = created.job_id, "job application received");
    Ok((StatusCode::CREATED, Json(created)))
}

// --- Admin (gated by the /api/admin route layer) ---

#[utoipa::path(
    get,
    path = "/api/admin/jobs",
    responses(
        (status = 200, description = "All jobs", body = [JobPosting]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_all_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobPosting>>> {
    Ok(Json(state.repo.list_all_jobs().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Created", body = JobPosting),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<JobPosting>)> {
    let job = state.repo.create_job(payload).await?;
    tracing::info!(id = job.id, "job posting created");
    Ok((StatusCode::CREATED, Json(job)))
}

/// update_job
///
/// [Admin Route] A body holding only `isPublished` is a publish toggle; any other
/// body is a partial update of the posting.
#[utoipa::path(
    patch,
    path = "/api/admin/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Updated", body = JobPosting),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_job(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateJobRequest>,
) -> ApiResult<Json<JobPosting>> {
    let updated = match payload.publish_toggle() {
        Some(is_published) => state.repo.set_job_published(id, is_published).await?,
        None => state.repo.update_job(id, payload).await?,
    };
    updated.map(Json).ok_or_else(job_not_found)
}

#[utoipa::path(
    delete,
    path = "/api/admin/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_job(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    if state.repo.delete_job(id).await? {
        tracing::info!(id, "job posting deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(job_not_found())
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/job-applications",
    responses(
        (status = 200, description = "All applications", body = [JobApplication]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_job_applications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<JobApplication>>> {
    Ok(Json(state.repo.list_job_applications().await?))
}
