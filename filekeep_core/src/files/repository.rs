use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use super::models::FileRecord;
use crate::error::{AppError, Result};

/// Insert payload for a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub uri: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub temporary: bool,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait FileRepositoryTrait: Send + Sync {
    async fn create(&self, record: NewFileRecord) -> Result<FileRecord>;
    async fn get_by_id(&self, fid: i64) -> Result<Option<FileRecord>>;
    async fn get_by_uri(&self, uri: &str) -> Result<Option<FileRecord>>;
    async fn set_permanent(&self, fid: i64) -> Result<()>;
    async fn delete(&self, fid: i64) -> Result<()>;
}

#[derive(Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<FileRecord> {
        Ok(FileRecord {
            fid: row.get::<i64, _>("fid"),
            uri: row.get("uri"),
            filename: row.get("filename"),
            content_type: row.get("content_type"),
            size: row.get::<i64, _>("size") as u64,
            temporary: row.get::<i64, _>("temporary") != 0,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String, _>("created_at"))
                .map_err(|e| AppError::Database(format!("Invalid datetime: {}", e)))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl FileRepositoryTrait for FileRepository {
    async fn create(&self, record: NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO files (uri, filename, content_type, size, temporary, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.uri)
        .bind(&record.filename)
        .bind(&record.content_type)
        .bind(record.size as i64)
        .bind(record.temporary as i64)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(FileRecord {
            fid: result.last_insert_rowid(),
            uri: record.uri,
            filename: record.filename,
            content_type: record.content_type,
            size: record.size,
            temporary: record.temporary,
            created_at: record.created_at,
        })
    }

    async fn get_by_id(&self, fid: i64) -> Result<Option<FileRecord>> {
        let row = sqlx::query(
            "SELECT fid, uri, filename, content_type, size, temporary, created_at FROM files WHERE fid = ?1"
        )
        .bind(fid)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_uri(&self, uri: &str) -> Result<Option<FileRecord>> {
        let row = sqlx::query(
            "SELECT fid, uri, filename, content_type, size, temporary, created_at FROM files WHERE uri = ?1"
        )
        .bind(uri)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn set_permanent(&self, fid: i64) -> Result<()> {
        let rows_affected = sqlx::query("UPDATE files SET temporary = 0 WHERE fid = ?1")
            .bind(fid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        Ok(())
    }

    async fn delete(&self, fid: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM files WHERE fid = ?1")
            .bind(fid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        Ok(())
    }
}
