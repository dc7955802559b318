use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    auth::{AdminStatus, issue_admin_token},
    config::AppConfig,
    error::{ApiError, ApiResult, ErrorResponse},
    models::{AdminLoginRequest, AdminLoginResponse, AdminSessionResponse},
    validation::ValidatedJson,
};

/// admin_login
///
/// [Public Route] Exchanges the shared admin password for a bearer token.
///
/// There is a single secret and no per-user accounts. The token never expires.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Token issued", body = AdminLoginResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid password", body = ErrorResponse)
    )
)]
pub async fn admin_login(
    State(config): State<AppConfig>,
    ValidatedJson(payload): ValidatedJson<AdminLoginRequest>,
) -> ApiResult<Json<AdminLoginResponse>> {
    if payload.password != config.admin_password {
        return Err(ApiError::InvalidPassword);
    }

    let token = issue_admin_token(Utc::now().timestamp_millis());
    tracing::info!("admin login succeeded");
    Ok(Json(AdminLoginResponse { token }))
}

/// admin_me
///
/// [Public Route] Reports whether the caller's token passes the admin gate. Always 200.
#[utoipa::path(
    get,
    path = "/api/admin/me",
    responses((status = 200, description = "Session state", body = AdminSessionResponse))
)]
pub async fn admin_me(AdminStatus(authenticated): AdminStatus) -> Json<AdminSessionResponse> {
    Json(AdminSessionResponse { authenticated })
}
