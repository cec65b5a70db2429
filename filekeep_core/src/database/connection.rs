use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::time::Duration;
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 as test")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database health check failed: {}", e);
                AppError::from(e)
            })?;

        let test_value: i32 = row.try_get("test").map_err(AppError::from)?;

        if test_value == 1 {
            Ok(())
        } else {
            Err(AppError::from(sqlx::Error::RowNotFound))
        }
    }
}

pub async fn get_database_pool(database_url: &str) -> Result<SqlitePool> {
    get_database_pool_with_config(database_url, &DatabaseConfig::default()).await
}

pub async fn get_database_pool_with_config(
    database_url: &str,
    config: &DatabaseConfig,
) -> Result<SqlitePool> {
    info!("Connecting to database: {}", database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .test_before_acquire(true)
        .connect(database_url)
        .await
        .map_err(|e| {
            error!("Failed to create database pool: {}", e);
            AppError::from(e)
        })?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .map_err(AppError::from)?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .map_err(AppError::from)?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await
        .map_err(AppError::from)?;

    sqlx::query("PRAGMA busy_timeout = 30000")
        .execute(&pool)
        .await
        .map_err(AppError::from)?;

    info!("Database connection pool created successfully");
    Ok(pool)
}
