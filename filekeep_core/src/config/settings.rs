use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub migrate_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory all field upload locations resolve under.
    pub root: PathBuf,
}

/// Declaration of one file-history field, the equivalent of placing the
/// widget on a form. Upload locations are relative to `storage.root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub label: String,
    pub location: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub auto_register: bool,
}

fn default_max_file_size_mb() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            fields: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            shutdown_timeout_seconds: 10,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./filekeep.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout_seconds: 30,
            migrate_on_start: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./uploads"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        if self.storage.root.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "Storage root cannot be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(ConfigError::Message(
                    "Field name cannot be empty".to_string(),
                ));
            }

            if !seen.insert(field.name.clone()) {
                return Err(ConfigError::Message(format!(
                    "Duplicate field name: {}",
                    field.name
                )));
            }

            // The upload location is mandatory in a field declaration.
            if field.location.is_empty() {
                return Err(ConfigError::Message(format!(
                    "Field '{}' must declare an upload location",
                    field.name
                )));
            }

            if field.max_file_size_mb == 0 {
                return Err(ConfigError::Message(format!(
                    "Field '{}' max file size must be greater than 0",
                    field.name
                )));
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.storage.root)?;

        for field in &self.fields {
            std::fs::create_dir_all(self.storage.root.join(&field.location))?;
        }

        Ok(())
    }
}
