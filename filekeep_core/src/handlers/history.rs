//! Thin controllers over the selection store and file storage. Every
//! mutating action redirects back to the caller-supplied destination, the
//! way the widget's table links expect.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::return_to;
use crate::error::{AppError, Result};
use crate::fields::FieldDefinition;
use crate::files::FileRecord;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub field: String,
    pub destination: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DestinationQuery {
    pub destination: Option<String>,
}

async fn lookup(
    state: &AppState,
    field_name: &str,
    fid: i64,
) -> Result<(std::sync::Arc<FieldDefinition>, FileRecord)> {
    let field = state
        .fields
        .get(field_name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown field: {}", field_name)))?;

    let record = state
        .file_manager
        .get_record(fid)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok((field, record))
}

/// Marks a file as the active one for a field.
pub async fn use_file(
    State(state): State<AppState>,
    Path(fid): Path<i64>,
    Query(query): Query<ActionQuery>,
) -> Result<Redirect> {
    let (field, record) = lookup(&state, &query.field, fid).await?;

    state.selections.activate(&field.name, record.fid).await?;
    tracing::info!(field = %field.name, fid, "marked file active");

    Ok(return_to(query.destination.as_deref()))
}

/// Re-asserts the already-active file. Same overwrite as `use_file`; the
/// table's Reload link on the active row points here.
pub async fn reload_file(
    State(state): State<AppState>,
    Path(fid): Path<i64>,
    Query(query): Query<ActionQuery>,
) -> Result<Redirect> {
    let (field, record) = lookup(&state, &query.field, fid).await?;

    state.selections.activate(&field.name, record.fid).await?;
    tracing::info!(field = %field.name, fid, "reloaded active file");

    Ok(return_to(query.destination.as_deref()))
}

/// Adds a file to a multiple-selection field's active set.
pub async fn select_file(
    State(state): State<AppState>,
    Path(fid): Path<i64>,
    Query(query): Query<ActionQuery>,
) -> Result<Redirect> {
    let (field, record) = lookup(&state, &query.field, fid).await?;

    if !field.multiple {
        return Err(AppError::BadRequest(format!(
            "Field '{}' is not a multiple-selection field",
            field.name
        )));
    }

    state.selections.select(&field.name, record.fid).await?;
    tracing::info!(field = %field.name, fid, "selected file");

    Ok(return_to(query.destination.as_deref()))
}

/// Removes a file from a multiple-selection field's active set.
pub async fn unselect_file(
    State(state): State<AppState>,
    Path(fid): Path<i64>,
    Query(query): Query<ActionQuery>,
) -> Result<Redirect> {
    let (field, record) = lookup(&state, &query.field, fid).await?;

    if !field.multiple {
        return Err(AppError::BadRequest(format!(
            "Field '{}' is not a multiple-selection field",
            field.name
        )));
    }

    state.selections.unselect(&field.name, record.fid).await?;
    tracing::info!(field = %field.name, fid, "unselected file");

    Ok(return_to(query.destination.as_deref()))
}

/// Deletes a file from disk and from the record store.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(fid): Path<i64>,
    Query(query): Query<DestinationQuery>,
) -> Result<Redirect> {
    state.file_manager.delete_file(fid).await?;

    Ok(return_to(query.destination.as_deref()))
}

/// Streams a file's bytes back as an attachment named after the stored
/// filename.
pub async fn download_file(
    State(state): State<AppState>,
    Path(fid): Path<i64>,
) -> Result<Response> {
    let (record, data) = state.file_manager.file_data(fid).await?;

    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        record
            .content_type
            .parse()
            .unwrap_or_else(|_| mime::APPLICATION_OCTET_STREAM.as_ref().parse().unwrap()),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        data.len().to_string().parse().unwrap(),
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        record.filename.replace('"', "\\\"")
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition.parse().unwrap());

    Ok((StatusCode::OK, headers, data).into_response())
}
