//! Active-file tracking per field, on top of the configuration store.
//!
//! Each field owns one configuration object named
//! `remember_files.<field-name>`. Single-selection fields keep the active
//! fid under `active_file`; multiple-selection fields keep a list under
//! `active_files`. Writes are read-modify-write on the whole object and are
//! not guarded against concurrent requests for the same field.

use serde_json::{json, Value};

use crate::config_store::ConfigStore;
use crate::error::Result;

const NAMESPACE: &str = "remember_files";
const ACTIVE_FILE: &str = "active_file";
const ACTIVE_FILES: &str = "active_files";

#[derive(Clone)]
pub struct SelectionStore {
    config: ConfigStore,
}

impl SelectionStore {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }

    fn config_name(field: &str) -> String {
        format!("{}.{}", NAMESPACE, field)
    }

    async fn load(&self, field: &str) -> Result<Value> {
        Ok(self
            .config
            .get(&Self::config_name(field))
            .await?
            .unwrap_or_else(|| json!({})))
    }

    async fn save(&self, field: &str, object: &Value) -> Result<()> {
        self.config.set(&Self::config_name(field), object).await
    }

    /// The active fid for a single-selection field.
    pub async fn active(&self, field: &str) -> Result<Option<i64>> {
        Ok(self.load(field).await?.get(ACTIVE_FILE).and_then(Value::as_i64))
    }

    /// The active set for a multiple-selection field.
    pub async fn active_set(&self, field: &str) -> Result<Vec<i64>> {
        Ok(self
            .load(field)
            .await?
            .get(ACTIVE_FILES)
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default())
    }

    /// Overwrites the active fid. Both the Use and Reload actions land here.
    pub async fn activate(&self, field: &str, fid: i64) -> Result<()> {
        let mut object = self.load(field).await?;
        object[ACTIVE_FILE] = json!(fid);
        self.save(field, &object).await
    }

    /// Appends a fid to the active set. Existing entries are kept as-is;
    /// duplicates are not collapsed.
    pub async fn select(&self, field: &str, fid: i64) -> Result<()> {
        let mut set = self.active_set(field).await?;
        set.push(fid);

        let mut object = self.load(field).await?;
        object[ACTIVE_FILES] = json!(set);
        self.save(field, &object).await
    }

    /// Removes exactly one matching entry from the active set, or no-ops
    /// when the fid is absent.
    pub async fn unselect(&self, field: &str, fid: i64) -> Result<()> {
        let mut set = self.active_set(field).await?;
        if let Some(position) = set.iter().position(|entry| *entry == fid) {
            set.remove(position);
        }

        let mut object = self.load(field).await?;
        object[ACTIVE_FILES] = json!(set);
        self.save(field, &object).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::run_migrations;
    use sqlx::SqlitePool;
    use tempfile::NamedTempFile;

    async fn create_test_store() -> (SelectionStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let database_url = format!("sqlite:{}", temp_file.path().display());
        let pool = SqlitePool::connect(&database_url).await.unwrap();
        run_migrations(pool.clone()).await.unwrap();
        (SelectionStore::new(ConfigStore::new(pool)), temp_file)
    }

    #[tokio::test]
    async fn test_activate_overwrites_single_key() {
        let (store, _db_file) = create_test_store().await;

        assert_eq!(store.active("configurations").await.unwrap(), None);

        store.activate("configurations", 3).await.unwrap();
        assert_eq!(store.active("configurations").await.unwrap(), Some(3));

        store.activate("configurations", 8).await.unwrap();
        assert_eq!(store.active("configurations").await.unwrap(), Some(8));

        // Only that field's key is touched.
        assert_eq!(store.active("layouts").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_select_appends_without_removing() {
        let (store, _db_file) = create_test_store().await;

        store.select("layouts", 1).await.unwrap();
        store.select("layouts", 2).await.unwrap();
        store.select("layouts", 1).await.unwrap();

        assert_eq!(store.active_set("layouts").await.unwrap(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_unselect_removes_exactly_one() {
        let (store, _db_file) = create_test_store().await;

        store.select("layouts", 1).await.unwrap();
        store.select("layouts", 2).await.unwrap();
        store.select("layouts", 1).await.unwrap();

        store.unselect("layouts", 1).await.unwrap();
        assert_eq!(store.active_set("layouts").await.unwrap(), vec![2, 1]);

        // Absent fid is a no-op.
        store.unselect("layouts", 99).await.unwrap();
        assert_eq!(store.active_set("layouts").await.unwrap(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_single_and_multiple_keys_coexist() {
        let (store, _db_file) = create_test_store().await;

        store.activate("configurations", 5).await.unwrap();
        store.select("configurations", 6).await.unwrap();

        assert_eq!(store.active("configurations").await.unwrap(), Some(5));
        assert_eq!(store.active_set("configurations").await.unwrap(), vec![6]);
    }
}
