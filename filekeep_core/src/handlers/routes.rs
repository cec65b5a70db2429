//! Route table for the file-history HTTP surface.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::{demo, history, upload, widget};
use crate::error::Result;
use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/demo", get(demo::demo_page))
        .route("/api/fields", get(widget::list_fields))
        .route("/api/fields/:field/files", get(widget::field_table))
        .route("/api/fields/:field/upload", post(upload::upload_file))
        .route("/files/:fid/use", get(history::use_file))
        .route("/files/:fid/reload", get(history::reload_file))
        .route("/files/:fid/select", get(history::select_file))
        .route("/files/:fid/unselect", get(history::unselect_file))
        .route("/files/:fid/delete", get(history::delete_file))
        .route("/files/:fid/download", get(history::download_file))
}

async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "app": state.app_name,
        "version": state.version,
        "endpoints": {
            "health": "/health",
            "demo": "/demo",
            "fields": "/api/fields",
            "field_files": "/api/fields/{field}/files",
            "upload": "/api/fields/{field}/upload",
            "use": "/files/{fid}/use",
            "reload": "/files/{fid}/reload",
            "select": "/files/{fid}/select",
            "unselect": "/files/{fid}/unselect",
            "delete": "/files/{fid}/delete",
            "download": "/files/{fid}/download"
        }
    }))
}

async fn handle_health(State(state): State<AppState>) -> Result<impl IntoResponse> {
    state.db_manager.health_check().await?;

    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
    })))
}
