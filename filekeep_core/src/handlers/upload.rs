//! Multipart upload handler for file-history fields.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{return_to, urlencode};
use crate::error::{AppError, Result};
use crate::files::{FileRecord, FileUpload};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub destination: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<FileRecord>,
    pub notices: Vec<String>,
}

/// Accepts one multipart upload (or several, for multiple-selection
/// fields), runs the field's validation pipeline, and stores accepted
/// files as permanent records. Redirects when the caller supplied a
/// destination, otherwise answers with the stored records.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(field_name): Path<String>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Response> {
    let field = state
        .fields
        .get(&field_name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown field: {}", field_name)))?;

    let mut uploads: Vec<FileUpload> = Vec::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = part.name().unwrap_or("").to_string();
        if name != "file" && name != "files" {
            continue;
        }

        let filename = part
            .file_name()
            .ok_or_else(|| AppError::BadRequest("Missing filename".to_string()))?
            .to_string();

        let content_type = part
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = part
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

        uploads.push(FileUpload {
            original_filename: filename,
            content_type,
            data: data.to_vec(),
        });

        if !field.multiple {
            break;
        }
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest("No file found in request".to_string()));
    }

    let mut files = Vec::new();
    let mut notices = Vec::new();

    for upload in uploads {
        match state.file_manager.store_upload(&field, upload).await {
            Ok(stored) => {
                files.push(stored.record);
                if let Some(notice) = stored.notice {
                    notices.push(notice);
                }
            }
            // Form posts carry a destination; send the user back to the
            // form with the message instead of a bare JSON error.
            Err(AppError::UploadValidation(message))
            | Err(AppError::ContentValidation(message))
                if query.destination.is_some() =>
            {
                let dest = with_message(query.destination.as_deref().unwrap_or(""), &message);
                return Ok(return_to(Some(&dest)).into_response());
            }
            Err(err) => return Err(err),
        }
    }

    if query.destination.is_some() {
        return Ok(return_to(query.destination.as_deref()).into_response());
    }

    Ok(Json(UploadResponse { files, notices }).into_response())
}

fn with_message(destination: &str, message: &str) -> String {
    let separator = if destination.contains('?') { '&' } else { '?' };
    format!("{}{}message={}", destination, separator, urlencode(message))
}
