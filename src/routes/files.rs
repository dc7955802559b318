use crate::{AppState, handlers};
use axum::{Router, routing::get};
use std::path::Path;
use tower_http::services::ServeDir;

/// File Router Module
///
/// `GET /storage/{folder}/{filename}` streams bucket objects. `/uploads/*` serves
/// files written to local disk before object storage was introduced.
pub fn file_routes(legacy_uploads_dir: &Path) -> Router<AppState> {
    Router::new()
        .route(
            "/storage/{folder}/{filename}",
            get(handlers::files::serve_object),
        )
        .nest_service("/uploads", ServeDir::new(legacy_uploads_dir))
}
