use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;
pub mod validation;

// Routing split by how admin access is enforced.
pub mod routes;
use routes::{admin, files, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MediaStorage, MemoryObjectStore, ObjectStore, S3ObjectStore};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::admin::admin_login, handlers::admin::admin_me,
        handlers::service_requests::create_service_request,
        handlers::service_requests::list_service_requests,
        handlers::service_requests::get_service_request,
        handlers::service_requests::update_service_request_status,
        handlers::content::list_content, handlers::content::create_content,
        handlers::content::upload_content, handlers::content::update_content,
        handlers::content::delete_content,
        handlers::candidates::list_candidates, handlers::candidates::create_candidate,
        handlers::candidates::upload_candidate, handlers::candidates::update_candidate_status,
        handlers::templates::list_templates, handlers::templates::list_all_templates,
        handlers::templates::upload_template, handlers::templates::update_template_status,
        handlers::templates::delete_template,
        handlers::jobs::list_jobs, handlers::jobs::get_job, handlers::jobs::apply_for_job,
        handlers::jobs::list_all_jobs, handlers::jobs::create_job, handlers::jobs::update_job,
        handlers::jobs::delete_job, handlers::jobs::list_job_applications,
        handlers::training::create_training_request,
        handlers::training::list_training_requests,
        handlers::training::update_training_request_status,
        handlers::files::serve_object,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::ServiceRequest, models::ServiceRequestStatus, models::CreateServiceRequest,
            models::UpdateServiceRequestStatus, models::SubmissionResponse,
            models::ContentItem, models::CreateContentItemRequest, models::UpdateContentItemRequest,
            models::VerifiedCandidate, models::CandidateStatus,
            models::CreateVerifiedCandidateRequest, models::UpdateCandidateStatus,
            models::Template, models::TemplateFileType, models::UpdateTemplateStatus,
            models::JobPosting, models::CreateJobRequest, models::UpdateJobRequest,
            models::JobApplication,
            models::TrainingRequest, models::TrainingRequestStatus,
            models::CreateTrainingRequest, models::UpdateTrainingRequestStatus,
            models::AdminLoginRequest, models::AdminLoginResponse, models::AdminSessionResponse,
            storage::Folder, storage::StoredObject,
        )
    ),
    tags(
        (name = "recruit-portal", description = "Recruitment & content portal API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single container of shared handles, built once in `main` (or a test) and
/// cloned into every request. Nothing in it is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Object storage adapter. May be unconfigured (no bucket).
    pub storage: MediaStorage,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Handlers pull only the component they need out of AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for MediaStorage {
    fn from_ref(app_state: &AppState) -> MediaStorage {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing table, applies the observability stack and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // /api/admin/* behind the require_admin route layer.
        .merge(admin::admin_routes())
        .merge(files::file_routes(state.storage.legacy_dir()))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, carrying the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `http_request` span for `TraceLayer` with method, uri and the
/// `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
