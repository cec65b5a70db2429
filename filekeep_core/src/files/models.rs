use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted record describing an uploaded file's metadata and storage
/// location. Files enter the store as temporary and are promoted to
/// permanent once the upload pipeline accepts them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub fid: i64,
    pub uri: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub temporary: bool,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

/// An upload candidate as read off the wire, before validation and storage.
#[derive(Debug)]
pub struct FileUpload {
    pub original_filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
