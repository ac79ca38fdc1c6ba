// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Bootstrap configuration for the system catalogs

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::storage::{IndexKind, StorageType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration read by [`SystemCatalogs::bootstrap`](crate::SystemCatalogs::bootstrap)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Storage backend holding every table tree
    pub storage_type: StorageType,

    /// Database directory; required by persistent backends
    pub path: Option<PathBuf>,

    /// Name of the database owning the catalog tables
    pub catalog_database_name: String,

    /// Index kind recorded for catalog and user indexes
    pub default_index_kind: IndexKind,

    /// Longest accepted database, schema or table name (bytes)
    pub max_name_length: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Memory,
            path: None,
            catalog_database_name: "pg_catalog".to_string(),
            default_index_kind: IndexKind::default(),
            max_name_length: 64,
        }
    }
}

impl CatalogConfig {
    /// Volatile catalogs, lost when dropped
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Catalogs persisted under `path`
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_type: StorageType::Sled,
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Load a JSON configuration file; absent fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.storage_type == StorageType::Sled && self.path.is_none() {
            return Err(CatalogError::InvalidParameters(
                "sled storage requires a path".to_string(),
            ));
        }
        if self.catalog_database_name.trim().is_empty() {
            return Err(CatalogError::InvalidParameters(
                "catalog database name must not be empty".to_string(),
            ));
        }
        if self.max_name_length == 0 {
            return Err(CatalogError::InvalidParameters(
                "max_name_length must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Reject empty names and names longer than `max_name_length`
    pub fn check_name(&self, what: &str, name: &str) -> CatalogResult<()> {
        if name.is_empty() {
            return Err(CatalogError::InvalidParameters(format!(
                "{} name must not be empty",
                what
            )));
        }
        if name.len() > self.max_name_length {
            return Err(CatalogError::InvalidParameters(format!(
                "{} name '{}' exceeds {} bytes",
                what, name, self.max_name_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.storage_type, StorageType::Memory);
        assert_eq!(config.catalog_database_name, "pg_catalog");
        assert_eq!(config.max_name_length, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sled_requires_path() {
        let mut config = CatalogConfig::persistent("/tmp/relcat");
        assert!(config.validate().is_ok());
        config.path = None;
        assert!(matches!(
            config.validate(),
            Err(CatalogError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"storage_type": "memory", "max_name_length": 16}}"#).unwrap();
        let config = CatalogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_name_length, 16);
        assert_eq!(config.catalog_database_name, "pg_catalog");
        assert!(config.check_name("schema", "a_very_long_schema_name").is_err());
        assert!(config.check_name("schema", "short").is_ok());
    }
}
