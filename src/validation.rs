//! Request-boundary shape checks.
//!
//! Every payload is deserialized, then run through its `validator` rules, and the
//! outcome is a typed `Result` rather than an exception threaded through handlers.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// validate_payload
///
/// Runs the declared rules and reports the first offending field. Fields are
/// visited in name order so the reported field is deterministic.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| first_error(&errors))
}

fn first_error(errors: &ValidationErrors) -> ApiError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors
        .iter()
        .map(|(field, errs)| (wire_name(field), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, errs) in fields {
        if let Some(err) = errs.first() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid {field}"));
            return ApiError::Validation {
                message,
                field: Some(field),
            };
        }
    }

    ApiError::Validation {
        message: "Invalid request body".to_string(),
        field: None,
    }
}

/// wire_name
///
/// `validator` keys errors by the Rust field name. Clients send camelCase, and
/// `content_type` travels as `type`.
pub fn wire_name(field: &str) -> String {
    if field == "content_type" {
        return "type".to_string();
    }

    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Pulls the key out of serde's "missing field `x`" message. Serde reports the
/// renamed key, so it is already the wire name.
fn missing_field(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("missing field `")?;
    rest.split_once('`').map(|(field, _)| field)
}

/// ValidatedJson
///
/// JSON extractor that only yields payloads that passed their `Validate` rules.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        validate_payload(&payload)?;
        Ok(Self(payload))
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Missing Content-Type: application/json header")
        }
        JsonRejection::JsonDataError(e) => {
            let text = e.body_text();
            match missing_field(&text).map(str::to_string) {
                Some(field) => ApiError::Validation {
                    message: format!("{field} is required"),
                    field: Some(field),
                },
                None => ApiError::Validation {
                    message: text,
                    field: None,
                },
            }
        }
        _ => ApiError::bad_request("Invalid JSON payload"),
    }
}

/// IdPath
///
/// Integer surrogate id from the `{id}` path segment. Non-numeric ids are a 400
/// with the standard error envelope instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation {
                message: "Invalid id".to_string(),
                field: Some("id".to_string()),
            })?;
        Ok(IdPath(id))
    }
}
