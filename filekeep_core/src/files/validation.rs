use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension { extension: String, allowed: Vec<String> },

    #[error("Filename too long: {length} characters (max: {max_length})")]
    FilenameTooLong { length: usize, max_length: usize },

    #[error("Invalid filename: {filename}")]
    InvalidFilename { filename: String },

    #[error("Empty file not allowed")]
    EmptyFile,
}

/// General upload validation, the equivalent of the platform's
/// extension/size upload validators.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_extensions: Vec<String>,
    max_file_size: u64,
    max_filename_length: usize,
}

impl UploadValidator {
    pub fn new(allowed_extensions: Vec<String>, max_file_size: u64) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            max_file_size,
            max_filename_length: 255,
        }
    }

    pub fn validate_upload(&self, filename: &str, data: &[u8]) -> Result<(), ValidationError> {
        if data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }

        if data.len() as u64 > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: data.len() as u64,
                max_size: self.max_file_size,
            });
        }

        self.validate_filename(filename)?;
        self.validate_extension(filename)?;

        Ok(())
    }

    fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.is_empty() {
            return Err(ValidationError::InvalidFilename {
                filename: filename.to_string(),
            });
        }

        if filename.len() > self.max_filename_length {
            return Err(ValidationError::FilenameTooLong {
                length: filename.len(),
                max_length: self.max_filename_length,
            });
        }

        if filename.contains('\0') || filename.contains('/') || filename.contains('\\') {
            return Err(ValidationError::InvalidFilename {
                filename: filename.to_string(),
            });
        }

        if filename.starts_with('.') {
            return Err(ValidationError::InvalidFilename {
                filename: filename.to_string(),
            });
        }

        Ok(())
    }

    fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        // No declared extensions means the field accepts anything.
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }

        let extension = extension_of(filename).to_ascii_lowercase();

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }
}

/// Builds the filename mask a directory scan uses to pick up candidate
/// files, e.g. `(?i)\.(xls|xlsx)$` for an xls/xlsx field. Fields without
/// declared extensions match everything.
pub fn extension_mask(extensions: &[String]) -> Regex {
    if extensions.is_empty() {
        return Regex::new(".").expect("static regex");
    }

    let alternatives: Vec<String> = extensions.iter().map(|ext| regex::escape(ext)).collect();
    let pattern = format!(r"(?i)\.({})$", alternatives.join("|"));
    Regex::new(&pattern).expect("extension alternation is always a valid regex")
}

pub fn extension_of(filename: &str) -> &str {
    filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// Data handed to a caller-supplied content validator before a candidate
/// upload is stored.
#[derive(Debug)]
pub struct ContentCandidate<'a> {
    pub original_name: &'a str,
    pub extension: &'a str,
    pub size: u64,
    pub data: &'a [u8],
}

/// Outcome of content validation. A rejecting verdict blocks the upload
/// entirely; the message, if any, is surfaced to the caller either way.
#[derive(Debug, Clone)]
pub struct ContentVerdict {
    pub accepted: bool,
    pub message: Option<String>,
}

impl ContentVerdict {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            message: None,
        }
    }

    pub fn accept_with(message: impl Into<String>) -> Self {
        Self {
            accepted: true,
            message: Some(message.into()),
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: Some(message.into()),
        }
    }
}

/// Caller-supplied hook for inspecting upload content before it is stored
/// and promoted to permanent.
pub trait ContentValidator: Send + Sync {
    fn validate(&self, candidate: &ContentCandidate<'_>) -> ContentVerdict;
}

impl<F> ContentValidator for F
where
    F: Fn(&ContentCandidate<'_>) -> ContentVerdict + Send + Sync,
{
    fn validate(&self, candidate: &ContentCandidate<'_>) -> ContentVerdict {
        self(candidate)
    }
}
