//! HTTP handlers, one module per resource.
//!
//! Admin-only handlers take `AdminGuard` as their first argument, so an
//! unauthenticated call is rejected before its body is read or the repository
//! is touched.

pub mod admin;
pub mod candidates;
pub mod content;
pub mod files;
pub mod form;
pub mod jobs;
pub mod service_requests;
pub mod templates;
pub mod training;

use axum::Json;
use serde_json::{Value, json};

/// health_check
///
/// [Public Route] Liveness probe. Touches neither the database nor the bucket.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
