pub mod settings;

pub use settings::{AppConfig, DatabaseConfig, FieldConfig, ServerConfig, StorageConfig};
