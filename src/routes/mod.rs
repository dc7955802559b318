//! Router Module Index
//!
//! Splits the routing table by how access is enforced.

/// Routes under `/api` whose admin-only members carry the `AdminGuard` extractor
/// themselves. Public and admin methods share paths here (e.g. `POST` vs `GET`
/// on `/api/service-requests`).
pub mod public;

/// Routes under `/api/admin` that sit behind the `require_admin` route layer.
pub mod admin;

/// Object streaming (`/storage`) and legacy static files (`/uploads`).
pub mod files;
