//! Main entry point for the file-history server binary.

use anyhow::Result;
use filekeep_core::database::get_database_pool_with_config;
use filekeep_core::{
    create_app, run_migrations, run_server, AppConfig, AppState, ContentCandidate,
    ContentVerdict, FieldDefinition, FieldRegistry,
};
use filekeep_core::config::FieldConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());
    info!("Database URL: {}", config.database.url);

    config
        .create_directories()
        .map_err(|e| anyhow::anyhow!("Failed to create directories: {}", e))?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let pool = get_database_pool_with_config(&config.database.url, &config.database).await?;

    if config.database.migrate_on_start {
        run_migrations(pool.clone()).await?;
    }

    let mut fields = FieldRegistry::from_config(&config.fields);
    register_demo_field(&mut fields);

    let state = AppState::new(&config, pool, fields);
    state.file_manager.initialize().await?;

    info!("App: {} v{}", state.app_name, state.version);
    info!("{} field(s) registered", state.fields.all().len());

    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Registers the demonstration field backing `/demo`: a single-selection
/// spreadsheet field with a content validator, showing how callers declare
/// the widget in code.
fn register_demo_field(fields: &mut FieldRegistry) {
    if fields.get("configurations").is_some() {
        return;
    }

    let field = FieldDefinition::from_config(&FieldConfig {
        name: "configurations".to_string(),
        label: "Configurations".to_string(),
        location: "configurations".to_string(),
        extensions: vec!["xls".to_string(), "xlsx".to_string()],
        max_file_size_mb: 10,
        multiple: false,
        auto_register: false,
    })
    .with_content_validator(Arc::new(spreadsheet_validator));

    fields.register(field);
}

fn spreadsheet_validator(candidate: &ContentCandidate<'_>) -> ContentVerdict {
    // xlsx files are zip archives; xls files start with the OLE2 header.
    let looks_valid = match candidate.extension.to_ascii_lowercase().as_str() {
        "xlsx" => candidate.data.starts_with(b"PK"),
        "xls" => candidate.data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]),
        _ => false,
    };

    if looks_valid {
        ContentVerdict::accept_with("OK")
    } else {
        ContentVerdict::reject(format!(
            "{} does not look like a spreadsheet file",
            candidate.original_name
        ))
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filekeep_core=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}
