use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;

use super::models::{FileRecord, FileUpload};
use super::repository::{FileRepository, FileRepositoryTrait, NewFileRecord};
use super::validation::{extension_of, ContentCandidate};
use crate::error::{AppError, Result};
use crate::fields::FieldDefinition;

#[derive(Clone)]
pub struct FileManagerConfig {
    /// Directory all field upload locations resolve under. Record URIs are
    /// stored relative to it.
    pub storage_root: PathBuf,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("uploads"),
        }
    }
}

/// Outcome of a stored upload: the promoted record plus any message the
/// field's content validator attached to its accepting verdict.
#[derive(Debug)]
pub struct StoredUpload {
    pub record: FileRecord,
    pub notice: Option<String>,
}

/// One file found on disk during a directory scan.
#[derive(Debug, Clone)]
pub struct ScanEntry {
    /// Path relative to the storage root; matches `FileRecord::uri`.
    pub uri: String,
    pub filename: String,
    /// Filename without its extension.
    pub name: String,
}

/// The managed-file pipeline: validates uploads, writes them under a
/// field's upload location, tracks them as records (temporary, then
/// permanent), and scans locations back off disk.
#[derive(Clone)]
pub struct FileManager {
    config: FileManagerConfig,
    repository: FileRepository,
}

impl FileManager {
    pub fn new(config: FileManagerConfig, repository: FileRepository) -> Self {
        Self { config, repository }
    }

    pub async fn initialize(&self) -> Result<()> {
        if !self.config.storage_root.exists() {
            async_fs::create_dir_all(&self.config.storage_root).await?;
        }

        Ok(())
    }

    pub fn real_path(&self, uri: &str) -> PathBuf {
        self.config.storage_root.join(uri)
    }

    fn location_dir(&self, field: &FieldDefinition) -> PathBuf {
        self.config.storage_root.join(&field.location)
    }

    fn uri_for(field: &FieldDefinition, filename: &str) -> String {
        format!("{}/{}", field.location.trim_end_matches('/'), filename)
    }

    /// Validates and stores one upload for a field, then promotes the new
    /// record from temporary to permanent. A rejecting content verdict
    /// blocks the upload before anything touches disk.
    pub async fn store_upload(
        &self,
        field: &FieldDefinition,
        upload: FileUpload,
    ) -> Result<StoredUpload> {
        field
            .upload_validator()
            .validate_upload(&upload.original_filename, &upload.data)
            .map_err(|e| AppError::UploadValidation(e.to_string()))?;

        let mut notice = None;
        if let Some(validator) = field.content_validator() {
            let candidate = ContentCandidate {
                original_name: &upload.original_filename,
                extension: extension_of(&upload.original_filename),
                size: upload.data.len() as u64,
                data: &upload.data,
            };

            let verdict = validator.validate(&candidate);
            if !verdict.accepted {
                let message = verdict
                    .message
                    .unwrap_or_else(|| "Upload rejected by content validation".to_string());
                tracing::warn!(
                    field = %field.name,
                    filename = %upload.original_filename,
                    "content validation rejected upload: {}",
                    message
                );
                return Err(AppError::ContentValidation(message));
            }

            notice = verdict.message;
        }

        let dir = self.location_dir(field);
        if !dir.exists() {
            async_fs::create_dir_all(&dir).await?;
        }

        let filename = available_filename(&dir, &upload.original_filename);
        let destination = dir.join(&filename);

        let mut file = async_fs::File::create(&destination).await?;
        file.write_all(&upload.data).await?;
        file.sync_all().await?;

        let record = self
            .repository
            .create(NewFileRecord {
                uri: Self::uri_for(field, &filename),
                filename,
                content_type: upload.content_type,
                size: upload.data.len() as u64,
                temporary: true,
                created_at: Utc::now(),
            })
            .await?;

        self.repository.set_permanent(record.fid).await?;

        tracing::info!(
            field = %field.name,
            fid = record.fid,
            uri = %record.uri,
            "stored upload as permanent file"
        );

        Ok(StoredUpload {
            record: FileRecord {
                temporary: false,
                ..record
            },
            notice,
        })
    }

    pub async fn get_record(&self, fid: i64) -> Result<Option<FileRecord>> {
        self.repository.get_by_id(fid).await
    }

    pub async fn record_for_uri(&self, uri: &str) -> Result<Option<FileRecord>> {
        self.repository.get_by_uri(uri).await
    }

    /// Reads a file's bytes fully into memory for download responses.
    pub async fn file_data(&self, fid: i64) -> Result<(FileRecord, Vec<u8>)> {
        let record = self
            .repository
            .get_by_id(fid)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let path = self.real_path(&record.uri);
        let data = async_fs::read(&path).await.map_err(|e| {
            tracing::error!("Failed to read file {}: {}", record.uri, e);
            AppError::InternalServerError
        })?;

        Ok((record, data))
    }

    /// Deletes a file from disk and from the record store.
    pub async fn delete_file(&self, fid: i64) -> Result<()> {
        let record = self
            .repository
            .get_by_id(fid)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let path = self.real_path(&record.uri);
        if path.exists() {
            async_fs::remove_file(&path).await.map_err(|e| {
                tracing::error!("Failed to delete file {}: {}", record.uri, e);
                AppError::InternalServerError
            })?;
        }

        self.repository.delete(fid).await?;

        tracing::info!(fid, uri = %record.uri, "deleted file");
        Ok(())
    }

    /// Lists files under a field's upload location whose names match the
    /// field's extension mask. The scan is a single level deep; upload
    /// locations are flat by construction.
    pub async fn scan_location(&self, field: &FieldDefinition) -> Result<Vec<ScanEntry>> {
        let dir = self.location_dir(field);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mask = field.scan_mask();
        let mut entries = Vec::new();

        let mut read_dir = async_fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let filename = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };

            if !mask.is_match(&filename) {
                continue;
            }

            let name = filename
                .rsplit_once('.')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or_else(|| filename.clone());

            entries.push(ScanEntry {
                uri: Self::uri_for(field, &filename),
                filename,
                name,
            });
        }

        Ok(entries)
    }

    /// Registers a file found on disk with no backing record, as a
    /// permanent record. Used by fields that auto-register scan results.
    pub async fn register_scanned(&self, entry: &ScanEntry) -> Result<FileRecord> {
        let path = self.real_path(&entry.uri);
        let metadata = async_fs::metadata(&path).await?;

        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        let record = self
            .repository
            .create(NewFileRecord {
                uri: entry.uri.clone(),
                filename: entry.filename.clone(),
                content_type,
                size: metadata.len(),
                temporary: false,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(fid = record.fid, uri = %record.uri, "auto-registered scanned file");
        Ok(record)
    }
}

/// Picks a filename that does not collide with an existing file in `dir`,
/// suffixing `_0`, `_1`, ... before the extension like the original
/// managed-file pipeline.
fn available_filename(dir: &Path, wanted: &str) -> String {
    if !dir.join(wanted).exists() {
        return wanted.to_string();
    }

    let (stem, ext) = match wanted.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (wanted, None),
    };

    let mut counter = 0u32;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };

        if !dir.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}
