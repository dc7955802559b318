use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AdminGuard,
    error::{ApiError, ApiResult, ErrorResponse},
    models::{CreateServiceRequest, ServiceRequest, SubmissionResponse, UpdateServiceRequestStatus},
    validation::{IdPath, ValidatedJson},
};

/// create_service_request
///
/// [Public Route] Contact-form submission. Only the new id is echoed back; the
/// stored record is visible to admins.
#[utoipa::path(
    post,
    path = "/api/service-requests",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Submitted", body = SubmissionResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_service_request(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateServiceRequest>,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let request = state.repo.create_service_request(payload).await?;
    tracing::info!(id = request.id, "service request submitted");

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            id: request.id,
            message: "Request submitted successfully".to_string(),
        }),
    ))
}

/// list_service_requests
///
/// [Admin Route] All service requests, newest first.
#[utoipa::path(
    get,
    path = "/api/service-requests",
    responses(
        (status = 200, description = "All requests", body = [ServiceRequest]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_service_requests(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ServiceRequest>>> {
    Ok(Json(state.repo.list_service_requests().await?))
}

#[utoipa::path(
    get,
    path = "/api/service-requests/{id}",
    params(("id" = i32, Path, description = "Service request ID")),
    responses(
        (status = 200, description = "Request", body = ServiceRequest),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_service_request(
    _admin: AdminGuard,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<ServiceRequest>> {
    state
        .repo
        .get_service_request(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Request not found"))
}

/// update_service_request_status
///
/// [Admin Route] Moves a request through pending / reviewed / approved / rejected.
#[utoipa::path(
    patch,
    path = "/api/service-requests/{id}",
    params(("id" = i32, Path, description = "Service request ID")),
    request_body = UpdateServiceRequestStatus,
    responses(
        (status = 200, description = "Updated", body = ServiceRequest),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_service_request_status(
    _admin: AdminGuard,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateServiceRequestStatus>,
) -> ApiResult<Json<ServiceRequest>> {
    state
        .repo
        .update_service_request_status(id, payload.status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Request not found"))
}
