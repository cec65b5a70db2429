//! Named configuration objects persisted in sqlite.
//!
//! Each object is addressed by a dotted name (for the file-history widget,
//! `remember_files.<field-name>`) and holds one JSON document. Objects are
//! created implicitly on first write and never deleted.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::Result;

#[derive(Clone)]
pub struct ConfigStore {
    pool: SqlitePool,
}

impl ConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, name: &str) -> Result<Option<serde_json::Value>> {
        let row = sqlx::query("SELECT data FROM config_objects WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.get("data");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    pub async fn set(&self, name: &str, data: &serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO config_objects (name, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(name)
        .bind(serde_json::to_string(data)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::run_migrations;
    use serde_json::json;
    use tempfile::NamedTempFile;

    async fn create_test_store() -> (ConfigStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let database_url = format!("sqlite:{}", temp_file.path().display());
        let pool = SqlitePool::connect(&database_url).await.unwrap();
        run_migrations(pool.clone()).await.unwrap();
        (ConfigStore::new(pool), temp_file)
    }

    #[tokio::test]
    async fn test_missing_object_is_none() {
        let (store, _db_file) = create_test_store().await;
        assert!(store.get("remember_files.absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_creates_and_overwrites() {
        let (store, _db_file) = create_test_store().await;

        store
            .set("remember_files.configurations", &json!({"active_file": 3}))
            .await
            .unwrap();
        let value = store
            .get("remember_files.configurations")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value["active_file"], 3);

        store
            .set("remember_files.configurations", &json!({"active_file": 7}))
            .await
            .unwrap();
        let value = store
            .get("remember_files.configurations")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value["active_file"], 7);
    }

    #[tokio::test]
    async fn test_objects_are_independent() {
        let (store, _db_file) = create_test_store().await;

        store
            .set("remember_files.one", &json!({"active_file": 1}))
            .await
            .unwrap();
        store
            .set("remember_files.two", &json!({"active_file": 2}))
            .await
            .unwrap();

        let one = store.get("remember_files.one").await.unwrap().unwrap();
        let two = store.get("remember_files.two").await.unwrap().unwrap();
        assert_eq!(one["active_file"], 1);
        assert_eq!(two["active_file"], 2);
    }
}
