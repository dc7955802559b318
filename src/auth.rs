use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::ApiError;

/// Decoded tokens issued by the login route begin with this marker.
pub const ADMIN_MARKER: &str = "admin:";

/// issue_admin_token
///
/// Builds the opaque bearer token handed out on a successful login: the base64
/// text of `admin:<issued-at millis>`. The timestamp is informational only; the
/// token carries no expiry.
pub fn issue_admin_token(issued_at_millis: i64) -> String {
    STANDARD.encode(format!("{ADMIN_MARKER}{issued_at_millis}"))
}

/// is_admin_token
///
/// The admin gate. Takes the raw `Authorization` header value, strips an optional
/// `Bearer ` prefix, decodes the remainder and checks for the admin marker.
///
/// Fails closed: an absent header, undecodable token, non-UTF-8 payload or a
/// wrong marker all yield `false`. It never errors.
pub fn is_admin_token(header_value: Option<&str>) -> bool {
    let Some(value) = header_value else {
        return false;
    };
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .is_some_and(|decoded| decoded.starts_with(ADMIN_MARKER))
}

fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// AdminGuard
///
/// Extractor form of the admin gate. Declared as the first argument of an admin
/// handler it rejects the request with 401 before the path, body or repository
/// are touched.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

impl<S> FromRequestParts<S> for AdminGuard
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if is_admin_token(authorization_header(parts)) {
            Ok(AdminGuard)
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// AdminStatus
///
/// Infallible variant for public routes whose result widens for admins
/// (e.g. the verified-candidate listing).
#[derive(Debug, Clone, Copy)]
pub struct AdminStatus(pub bool);

impl<S> FromRequestParts<S> for AdminStatus
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AdminStatus(is_admin_token(authorization_header(parts))))
    }
}

/// require_admin
///
/// Middleware for routers where every route is admin-only. The `AdminGuard`
/// extractor short-circuits with 401; otherwise the request proceeds untouched.
pub async fn require_admin(_guard: AdminGuard, request: Request, next: Next) -> Response {
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_passes_gate() {
        let token = issue_admin_token(1_700_000_000_000);
        assert!(is_admin_token(Some(&format!("Bearer {token}"))));
    }

    #[test]
    fn bearer_prefix_is_optional() {
        let token = issue_admin_token(42);
        assert!(is_admin_token(Some(&token)));
    }

    #[test]
    fn timestamp_suffix_is_irrelevant() {
        for suffix in ["", "0", "-5", "not-a-number", "1700000000000"] {
            let token = STANDARD.encode(format!("admin:{suffix}"));
            assert!(is_admin_token(Some(&format!("Bearer {token}"))), "{suffix}");
        }
    }

    #[test]
    fn missing_or_malformed_headers_fail_closed() {
        let wrong_marker = STANDARD.encode("user:123");
        let not_utf8 = STANDARD.encode([0xff, 0xfe, 0xfd]);
        let cases = [
            None,
            Some(""),
            Some("Bearer "),
            Some("Bearer !!!not-base64!!!"),
            Some("Basic YWRtaW46MTIz"),
            Some(wrong_marker.as_str()),
            Some(not_utf8.as_str()),
            Some("admin:123"),
        ];
        for case in cases {
            assert!(!is_admin_token(case), "{case:?}");
        }
    }

    #[test]
    fn marker_must_be_a_prefix() {
        let token = STANDARD.encode("xadmin:1");
        assert!(!is_admin_token(Some(&token)));
    }
}
