pub mod manager;
pub mod models;
pub mod repository;
pub mod validation;

pub use manager::{FileManager, FileManagerConfig};
pub use models::{FileRecord, FileUpload};
pub use repository::{FileRepository, FileRepositoryTrait};
pub use validation::{
    ContentCandidate, ContentValidator, ContentVerdict, UploadValidator, ValidationError,
};
