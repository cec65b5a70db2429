//! Core library for the file-history service: file storage, selection
//! tracking, the operations table, and the HTTP handlers over them.

pub mod config;
pub mod config_store;
pub mod database;
pub mod error;
pub mod fields;
pub mod files;
pub mod handlers;
pub mod history;
pub mod middleware;

pub use config::AppConfig;
pub use config_store::ConfigStore;
pub use database::{get_database_pool, run_migrations, DatabaseManager};
pub use error::{AppError, Result};
pub use fields::{FieldDefinition, FieldRegistry};
pub use files::{
    ContentCandidate, ContentValidator, ContentVerdict, FileManager, FileManagerConfig,
    FileRecord, FileRepository,
};
pub use handlers::routes::create_routes;
pub use history::SelectionStore;

use axum::Router;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub db_manager: DatabaseManager,
    pub file_manager: FileManager,
    pub selections: SelectionStore,
    pub fields: FieldRegistry,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: SqlitePool, fields: FieldRegistry) -> Self {
        let repository = FileRepository::new(pool.clone());
        let file_manager = FileManager::new(
            FileManagerConfig {
                storage_root: config.storage.root.clone(),
            },
            repository,
        );
        let selections = SelectionStore::new(ConfigStore::new(pool.clone()));

        Self {
            app_name: "filekeep".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            db_manager: DatabaseManager::new(pool),
            file_manager,
            selections,
            fields,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(middleware::cors_layer())
        .layer(middleware::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
