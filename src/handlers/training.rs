use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::{ApiError, ApiResult, ErrorResponse},
    models::{
        CreateTrainingRequest, SubmissionResponse, TrainingRequest, UpdateTrainingRequestStatus,
    },
    validation::{IdPath, ValidatedJson},
};

/// create_training_request
///
/// [Public Route] Training enrolment enquiry. Answers with the id only.
#[utoipa::path(
    post,
    path = "/api/training-requests",
    request_body = CreateTrainingRequest,
    responses(
        (status = 201, description = "Submitted", body = SubmissionResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_training_request(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTrainingRequest>,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let request = state.repo.create_training_request(payload).await?;
    tracing::info!(id = request.id, "training request submitted");

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            id: request.id,
            message: "Training request submitted successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/training-requests",
    responses(
        (status = 200, description = "All training requests", body = [TrainingRequest]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_training_requests(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TrainingRequest>>> {
    Ok(Json(state.repo.list_training_requests().await?))
}

#[utoipa::path(
    patch,
    path = "/api/admin/training-requests/{id}",
    params(("id" = i32, Path, description = "Training request ID")),
    request_body = UpdateTrainingRequestStatus,
    responses(
        (status = 200, description = "Updated", body = TrainingRequest),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_training_request_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateTrainingRequestStatus>,
) -> ApiResult<Json<TrainingRequest>> {
    state
        .repo
        .update_training_request_status(id, payload.status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Training request not found"))
}
