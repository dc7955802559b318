use crate::{AppState, auth, handlers};
use axum::{
    Router,
    middleware,
    routing::{get, patch},
};

/// Admin Router Module
///
/// Back-office routes under `/api/admin`. The whole router sits behind the
/// `require_admin` route layer, so handlers here take no guard argument.
/// Unmatched paths still fall through to the 404 fallback instead of a 401.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // Jobs, including unpublished postings.
        .route(
            "/api/admin/jobs",
            get(handlers::jobs::list_all_jobs).post(handlers::jobs::create_job),
        )
        // PATCH toggles publication or applies a partial update; DELETE cascades to applications.
        .route(
            "/api/admin/jobs/{id}",
            patch(handlers::jobs::update_job).delete(handlers::jobs::delete_job),
        )
        .route(
            "/api/admin/job-applications",
            get(handlers::jobs::list_job_applications),
        )
        .route(
            "/api/admin/training-requests",
            get(handlers::training::list_training_requests),
        )
        .route(
            "/api/admin/training-requests/{id}",
            patch(handlers::training::update_training_request_status),
        )
        .route_layer(middleware::from_fn(auth::require_admin))
}
