//! Field definitions, the service-side equivalent of declaring the
//! file-history widget on a form.
//!
//! A field names an upload location, its upload validators (extension list,
//! size cap), whether it tracks a single active file or an active set, and
//! optionally a caller-supplied content validator run before uploads are
//! accepted.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

use crate::config::FieldConfig;
use crate::files::validation::{extension_mask, ContentValidator, UploadValidator};

#[derive(Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    /// Upload location, relative to the storage root.
    pub location: String,
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub multiple: bool,
    pub auto_register: bool,
    content_validator: Option<Arc<dyn ContentValidator>>,
}

impl FieldDefinition {
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            name: config.name.clone(),
            label: config.label.clone(),
            location: config.location.clone(),
            extensions: config.extensions.clone(),
            max_file_size: config.max_file_size_mb * 1024 * 1024,
            multiple: config.multiple,
            auto_register: config.auto_register,
            content_validator: None,
        }
    }

    pub fn with_content_validator(mut self, validator: Arc<dyn ContentValidator>) -> Self {
        self.content_validator = Some(validator);
        self
    }

    pub fn content_validator(&self) -> Option<&Arc<dyn ContentValidator>> {
        self.content_validator.as_ref()
    }

    pub fn upload_validator(&self) -> UploadValidator {
        UploadValidator::new(self.extensions.clone(), self.max_file_size)
    }

    pub fn scan_mask(&self) -> Regex {
        extension_mask(&self.extensions)
    }

    pub fn summary(&self) -> FieldSummary {
        FieldSummary {
            name: self.name.clone(),
            label: self.label.clone(),
            location: self.location.clone(),
            extensions: self.extensions.clone(),
            max_file_size: self.max_file_size,
            multiple: self.multiple,
            auto_register: self.auto_register,
            content_validated: self.content_validator.is_some(),
        }
    }
}

impl std::fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("extensions", &self.extensions)
            .field("multiple", &self.multiple)
            .field("auto_register", &self.auto_register)
            .field("content_validated", &self.content_validator.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub label: String,
    pub location: String,
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub multiple: bool,
    pub auto_register: bool,
    pub content_validated: bool,
}

/// All fields declared for this service, looked up by name from handlers.
#[derive(Clone, Default)]
pub struct FieldRegistry {
    fields: HashMap<String, Arc<FieldDefinition>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(configs: &[FieldConfig]) -> Self {
        let mut registry = Self::new();
        for config in configs {
            registry.register(FieldDefinition::from_config(config));
        }
        registry
    }

    pub fn register(&mut self, field: FieldDefinition) {
        self.fields.insert(field.name.clone(), Arc::new(field));
    }

    pub fn get(&self, name: &str) -> Option<Arc<FieldDefinition>> {
        self.fields.get(name).cloned()
    }

    pub fn all(&self) -> Vec<Arc<FieldDefinition>> {
        let mut fields: Vec<_> = self.fields.values().cloned().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::validation::{ContentCandidate, ContentVerdict};

    fn field_config() -> FieldConfig {
        FieldConfig {
            name: "configurations".to_string(),
            label: "Configurations".to_string(),
            location: "configurations".to_string(),
            extensions: vec!["xls".to_string(), "xlsx".to_string()],
            max_file_size_mb: 2,
            multiple: false,
            auto_register: false,
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = FieldRegistry::from_config(&[field_config()]);

        let field = registry.get("configurations").unwrap();
        assert_eq!(field.max_file_size, 2 * 1024 * 1024);
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.all().len(), 1);
    }

    #[test]
    fn test_content_validator_attachment() {
        let field = FieldDefinition::from_config(&field_config()).with_content_validator(
            Arc::new(|_: &ContentCandidate<'_>| ContentVerdict::accept()),
        );

        assert!(field.content_validator().is_some());
        assert!(field.summary().content_validated);
    }
}
