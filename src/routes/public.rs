use crate::{AppState, handlers, handlers::form::MAX_UPLOAD_BYTES};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

/// Public Router Module
///
/// Every `/api` route outside `/api/admin/*`, plus `/health` and the admin
/// session endpoints. Admin-only handlers in here reject anonymous callers through
/// their `AdminGuard` argument before anything else runs.
///
/// Multipart upload routes lift the body limit to `MAX_UPLOAD_BYTES`.
pub fn public_routes() -> Router<AppState> {
    let upload_limit = || DefaultBodyLimit::max(MAX_UPLOAD_BYTES);

    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(handlers::health_check))
        // Admin session: login issues the token, me reports whether it is valid.
        .route("/api/admin/login", post(handlers::admin::admin_login))
        .route("/api/admin/me", get(handlers::admin::admin_me))
        // Service requests: public create, admin list/get/status.
        .route(
            "/api/service-requests",
            post(handlers::service_requests::create_service_request)
                .get(handlers::service_requests::list_service_requests),
        )
        .route(
            "/api/service-requests/{id}",
            get(handlers::service_requests::get_service_request)
                .patch(handlers::service_requests::update_service_request_status),
        )
        // Content: published listing is public; writes are admin.
        .route(
            "/api/content",
            get(handlers::content::list_content).post(handlers::content::create_content),
        )
        .route(
            "/api/content/upload",
            post(handlers::content::upload_content).layer(upload_limit()),
        )
        .route(
            "/api/content/{id}",
            patch(handlers::content::update_content).delete(handlers::content::delete_content),
        )
        // Verified candidates: listing widens for admins.
        .route(
            "/api/verified-candidates",
            get(handlers::candidates::list_candidates).post(handlers::candidates::create_candidate),
        )
        .route(
            "/api/verified-candidates/upload",
            post(handlers::candidates::upload_candidate).layer(upload_limit()),
        )
        .route(
            "/api/verified-candidates/{id}",
            patch(handlers::candidates::update_candidate_status),
        )
        // Templates
        .route("/api/templates", get(handlers::templates::list_templates))
        .route("/api/templates/all", get(handlers::templates::list_all_templates))
        .route(
            "/api/templates/upload",
            post(handlers::templates::upload_template).layer(upload_limit()),
        )
        .route(
            "/api/templates/{id}",
            patch(handlers::templates::update_template_status)
                .delete(handlers::templates::delete_template),
        )
        // Jobs: published listing, detail and the CV application form.
        .route("/api/jobs", get(handlers::jobs::list_jobs))
        .route(
            "/api/jobs/apply",
            post(handlers::jobs::apply_for_job).layer(upload_limit()),
        )
        .route("/api/jobs/{id}", get(handlers::jobs::get_job))
        // Training requests: public create only; review happens under /api/admin.
        .route(
            "/api/training-requests",
            post(handlers::training::create_training_request),
        )
}
