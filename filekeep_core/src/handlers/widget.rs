//! Read side of the widget: field discovery and the operations table.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::fields::FieldSummary;
use crate::history::{build_table, FileHistoryTable};
use crate::AppState;

pub async fn list_fields(State(state): State<AppState>) -> Json<Vec<FieldSummary>> {
    Json(state.fields.all().iter().map(|f| f.summary()).collect())
}

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub destination: Option<String>,
}

/// The widget table for one field: a fresh directory scan reconciled
/// against file records, with the active marker and operation links.
pub async fn field_table(
    State(state): State<AppState>,
    Path(field_name): Path<String>,
    Query(query): Query<TableQuery>,
) -> Result<Json<FileHistoryTable>> {
    let field = state
        .fields
        .get(&field_name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown field: {}", field_name)))?;

    let destination = query.destination.as_deref().unwrap_or("/demo");

    let table = build_table(&field, &state.file_manager, &state.selections, destination).await?;

    Ok(Json(table))
}
