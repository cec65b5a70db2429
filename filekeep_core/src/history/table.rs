//! Builds the file-history operations table for a field.
//!
//! Every build rescans the field's upload location, reconciles the scan
//! against file records by URI, marks the active file (or active set) from
//! configuration, and emits rows sorted by upload time, newest first, with
//! contextual operation links.

use serde::Serialize;

use crate::error::Result;
use crate::fields::FieldDefinition;
use crate::files::FileManager;
use crate::history::SelectionStore;

#[derive(Debug, Clone, Serialize)]
pub struct FileHistoryTable {
    pub field: String,
    pub header: Vec<String>,
    pub rows: Vec<FileRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRow {
    pub fid: i64,
    pub name: String,
    pub filename: String,
    pub uploaded_at: String,
    pub active: bool,
    pub operations: Vec<OperationLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationLink {
    pub title: String,
    pub url: String,
}

impl OperationLink {
    fn new(title: &str, url: String) -> Self {
        Self {
            title: title.to_string(),
            url,
        }
    }
}

fn action_url(fid: i64, action: &str, field: &str, destination: &str) -> String {
    format!(
        "/files/{}/{}?field={}&destination={}",
        fid, action, field, destination
    )
}

pub async fn build_table(
    field: &FieldDefinition,
    manager: &FileManager,
    selections: &SelectionStore,
    destination: &str,
) -> Result<FileHistoryTable> {
    let active_single = selections.active(&field.name).await?;
    let active_set = if field.multiple {
        selections.active_set(&field.name).await?
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();

    for entry in manager.scan_location(field).await? {
        let record = match manager.record_for_uri(&entry.uri).await? {
            Some(record) => record,
            None if field.auto_register => manager.register_scanned(&entry).await?,
            // Files on disk without a record are not listed for fields
            // that do not auto-register.
            None => continue,
        };

        let active = if field.multiple {
            active_set.contains(&record.fid)
        } else {
            active_single == Some(record.fid)
        };

        let mut operations = Vec::new();
        if field.multiple {
            if active {
                operations.push(OperationLink::new(
                    "Unselect",
                    action_url(record.fid, "unselect", &field.name, destination),
                ));
            } else {
                operations.push(OperationLink::new(
                    "Select",
                    action_url(record.fid, "select", &field.name, destination),
                ));
            }
        } else if active {
            operations.push(OperationLink::new(
                "Reload",
                action_url(record.fid, "reload", &field.name, destination),
            ));
        } else {
            operations.push(OperationLink::new(
                "Use",
                action_url(record.fid, "use", &field.name, destination),
            ));
        }

        // The active file cannot be deleted out from under its field.
        if !active {
            operations.push(OperationLink::new(
                "Delete",
                format!("/files/{}/delete?destination={}", record.fid, destination),
            ));
        }

        operations.push(OperationLink::new(
            "Download",
            format!("/files/{}/download", record.fid),
        ));

        rows.push((
            record.created_at,
            FileRow {
                fid: record.fid,
                name: entry.name,
                filename: entry.filename,
                uploaded_at: record.created_at.format("%Y-%m-%d %H:%M").to_string(),
                active,
                operations,
            },
        ));
    }

    // Newest uploads first; ties broken by fid so ordering stays stable.
    rows.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.fid.cmp(&a.1.fid)));

    Ok(FileHistoryTable {
        field: field.name.clone(),
        header: vec![
            "Name".to_string(),
            "Filename".to_string(),
            "Uploaded at".to_string(),
            "Is active file ?".to_string(),
            "Operations".to_string(),
        ],
        rows: rows.into_iter().map(|(_, row)| row).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use crate::config_store::ConfigStore;
    use crate::database::run_migrations;
    use crate::files::repository::{FileRepositoryTrait, NewFileRecord};
    use crate::files::{FileManagerConfig, FileRepository};
    use chrono::{Duration, Utc};
    use sqlx::SqlitePool;
    use tempfile::{NamedTempFile, TempDir};

    struct Fixture {
        manager: FileManager,
        repository: FileRepository,
        selections: SelectionStore,
        _dir: TempDir,
        _db_file: NamedTempFile,
        root: std::path::PathBuf,
    }

    async fn create_fixture() -> Fixture {
        let temp_file = NamedTempFile::new().unwrap();
        let database_url = format!("sqlite:{}", temp_file.path().display());
        let pool = SqlitePool::connect(&database_url).await.unwrap();
        run_migrations(pool.clone()).await.unwrap();

        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let repository = FileRepository::new(pool.clone());
        let manager = FileManager::new(
            FileManagerConfig {
                storage_root: root.clone(),
            },
            repository.clone(),
        );
        manager.initialize().await.unwrap();

        Fixture {
            manager,
            repository,
            selections: SelectionStore::new(ConfigStore::new(pool)),
            _dir: dir,
            _db_file: temp_file,
            root,
        }
    }

    fn test_field(multiple: bool, auto_register: bool) -> FieldDefinition {
        FieldDefinition::from_config(&FieldConfig {
            name: "configurations".to_string(),
            label: "Configurations".to_string(),
            location: "configurations".to_string(),
            extensions: vec!["txt".to_string()],
            max_file_size_mb: 1,
            multiple,
            auto_register,
        })
    }

    /// Writes a file under the field location and records it with the given
    /// age so sort order is deterministic.
    async fn seed_file(fixture: &Fixture, filename: &str, age_minutes: i64) -> i64 {
        let dir = fixture.root.join("configurations");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(filename), b"seeded").unwrap();

        let record = fixture
            .repository
            .create(NewFileRecord {
                uri: format!("configurations/{}", filename),
                filename: filename.to_string(),
                content_type: "text/plain".to_string(),
                size: 6,
                temporary: false,
                created_at: Utc::now() - Duration::minutes(age_minutes),
            })
            .await
            .unwrap();
        record.fid
    }

    fn titles(row: &FileRow) -> Vec<&str> {
        row.operations.iter().map(|op| op.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_active_row_marker_and_links() {
        let fixture = create_fixture().await;
        let field = test_field(false, false);

        let old = seed_file(&fixture, "old.txt", 10).await;
        let new = seed_file(&fixture, "new.txt", 1).await;
        fixture.selections.activate("configurations", old).await.unwrap();

        let table = build_table(&field, &fixture.manager, &fixture.selections, "/demo")
            .await
            .unwrap();

        assert_eq!(table.rows.len(), 2);
        // Newest first.
        assert_eq!(table.rows[0].fid, new);
        assert_eq!(table.rows[1].fid, old);

        let active_row = &table.rows[1];
        assert!(active_row.active);
        assert_eq!(titles(active_row), vec!["Reload", "Download"]);

        let inactive_row = &table.rows[0];
        assert!(!inactive_row.active);
        assert_eq!(titles(inactive_row), vec!["Use", "Delete", "Download"]);
        assert_eq!(
            inactive_row.operations[0].url,
            format!("/files/{}/use?field=configurations&destination=/demo", new)
        );
    }

    #[tokio::test]
    async fn test_multiple_mode_links() {
        let fixture = create_fixture().await;
        let field = test_field(true, false);

        let selected = seed_file(&fixture, "selected.txt", 5).await;
        let other = seed_file(&fixture, "other.txt", 2).await;
        fixture
            .selections
            .select("configurations", selected)
            .await
            .unwrap();

        let table = build_table(&field, &fixture.manager, &fixture.selections, "/demo")
            .await
            .unwrap();

        let selected_row = table.rows.iter().find(|r| r.fid == selected).unwrap();
        assert!(selected_row.active);
        assert_eq!(titles(selected_row), vec!["Unselect", "Download"]);

        let other_row = table.rows.iter().find(|r| r.fid == other).unwrap();
        assert!(!other_row.active);
        assert_eq!(titles(other_row), vec!["Select", "Delete", "Download"]);
    }

    #[tokio::test]
    async fn test_unrecorded_files_are_skipped_without_auto_register() {
        let fixture = create_fixture().await;
        let field = test_field(false, false);

        let dir = fixture.root.join("configurations");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("orphan.txt"), b"no record").unwrap();

        let table = build_table(&field, &fixture.manager, &fixture.selections, "/demo")
            .await
            .unwrap();
        assert!(table.rows.is_empty());
    }

    #[tokio::test]
    async fn test_auto_register_creates_permanent_records() {
        let fixture = create_fixture().await;
        let field = test_field(false, true);

        let dir = fixture.root.join("configurations");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("orphan.txt"), b"no record").unwrap();

        let table = build_table(&field, &fixture.manager, &fixture.selections, "/demo")
            .await
            .unwrap();
        assert_eq!(table.rows.len(), 1);

        let record = fixture
            .manager
            .record_for_uri("configurations/orphan.txt")
            .await
            .unwrap()
            .unwrap();
        assert!(!record.temporary);

        // A second build reuses the record instead of registering again.
        let again = build_table(&field, &fixture.manager, &fixture.selections, "/demo")
            .await
            .unwrap();
        assert_eq!(again.rows.len(), 1);
        assert_eq!(again.rows[0].fid, record.fid);
    }

    #[tokio::test]
    async fn test_mask_filters_scan() {
        let fixture = create_fixture().await;
        let field = test_field(false, true);

        let dir = fixture.root.join("configurations");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("listed.txt"), b"yes").unwrap();
        std::fs::write(dir.join("ignored.csv"), b"no").unwrap();

        let table = build_table(&field, &fixture.manager, &fixture.selections, "/demo")
            .await
            .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].filename, "listed.txt");
    }
}
