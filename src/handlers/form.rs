use axum::extract::{Multipart, multipart::MultipartError};
use bytes::Bytes;
use serde::de::{
    DeserializeOwned, IntoDeserializer,
    value::{Error as ValueError, StrDeserializer},
};
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};

/// Largest accepted multipart request body (100 MiB).
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// MIME types an uploaded file may declare.
pub const ALLOWED_MIME_TYPES: [&str; 8] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "video/mp4",
    "video/webm",
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

pub fn is_allowed_mime(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// A file part, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// MultipartForm
///
/// Collected text fields and file parts of a `multipart/form-data` body.
/// Parts with an empty filename (an unset `<input type="file">`) are dropped.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::bad_request(err.body_text())
}

impl MultipartForm {
    /// parse
    ///
    /// Drains the multipart stream. A file with a MIME type outside
    /// `ALLOWED_MIME_TYPES` rejects the whole request before anything is stored.
    pub async fn parse(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) if !file_name.is_empty() => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    if !is_allowed_mime(&content_type) {
                        return Err(ApiError::bad_request(format!(
                            "Invalid file type: {content_type}"
                        )));
                    }
                    let data = field.bytes().await.map_err(multipart_error)?;
                    tracing::debug!(field = %name, file_name = %file_name, size = data.len(), "received file part");
                    form.files.push(UploadedFile {
                        field: name,
                        file_name,
                        content_type,
                        data,
                    });
                }
                Some(_) => {}
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Raw value, empty string when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// `None` for absent or empty values.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields.get(name).filter(|v| !v.is_empty()).cloned()
    }

    /// Checkbox-style flag: only the literal `"true"` is set.
    pub fn flag(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|v| v == "true")
    }

    /// Parses a lowercase enum value (e.g. a status) from a text field.
    pub fn parse_enum<T: DeserializeOwned>(&self, name: &str) -> ApiResult<Option<T>> {
        let Some(raw) = self.optional(name) else {
            return Ok(None);
        };
        let deserializer: StrDeserializer<'_, ValueError> = raw.as_str().into_deserializer();
        T::deserialize(deserializer)
            .map(Some)
            .map_err(|_| ApiError::Validation {
                message: format!("Invalid {name}"),
                field: Some(name.to_string()),
            })
    }

    /// Removes and returns the first file uploaded under any of `fields`, in the
    /// order the names are given.
    pub fn take_file(&mut self, fields: &[&str]) -> Option<UploadedFile> {
        fields.iter().find_map(|wanted| {
            let idx = self.files.iter().position(|f| f.field == *wanted)?;
            Some(self.files.remove(idx))
        })
    }
}
