//! Multipart extraction for upload handlers

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use market_core::{AppError, OwnerId};
use market_storage::MediaUpload;
use std::collections::HashMap;

/// A parsed upload form: exactly one `file` part plus text fields.
#[derive(Debug)]
pub struct UploadForm {
    pub file: MediaUpload,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Required numeric owner id field (e.g. `shopId`)
    pub fn owner_id(&self, name: &str) -> Result<OwnerId, AppError> {
        let raw = self
            .fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::InvalidInput(format!("Missing required field '{}'", name)))?;

        raw.parse::<OwnerId>().map_err(|_| {
            AppError::InvalidInput(format!("Field '{}' must be an integer, got '{}'", name, raw))
        })
    }
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Body-limit failures surface as 413; anything else is a malformed form.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body exceeds the upload limit: {}", err))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, err))
    }
}

/// Extract the file part and text fields from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<MediaUpload> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(normalize_mime_type)
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read file data", e))?;

            file = Some(MediaUpload::new(filename, content_type, data));
        } else if !field_name.is_empty() {
            let value = field.text().await.map_err(|e| {
                multipart_error(&format!("Failed to read field '{}'", field_name), e)
            })?;
            fields.insert(field_name, value);
        }
    }

    let file = file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok(UploadForm { file, fields })
}
