// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Key-value backends underneath the data tables
//!
//! A driver hands out named trees. Each [`DataTable`](crate::storage::DataTable)
//! owns one tree keyed by big-endian row id, and the registry keeps one more
//! tree of table descriptors. Sled persists them; the memory driver does not.

pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;
pub mod traits;

pub use memory::MemoryStorageDriver;
pub use traits::{BoxedStorageDriver, StorageDriver, StorageTree, TreeIter};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Backend selected by [`CatalogConfig`](crate::config::CatalogConfig)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// On-disk sled database
    #[default]
    Sled,
    /// Process-local trees, gone on drop
    Memory,
}

impl StorageType {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageType::Sled => "sled",
            StorageType::Memory => "memory",
        }
    }
}

impl FromStr for StorageType {
    type Err = StorageDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [StorageType::Sled, StorageType::Memory]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                StorageDriverError::Unavailable(format!("no storage backend called '{}'", s))
            })
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageDriverError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Backend missing from this build, or an unknown backend name
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend failed: {0}")]
    BackendSpecific(String),
}

pub type StorageResult<T> = Result<T, StorageDriverError>;

/// Open the backend named by `storage_type`. The memory driver ignores `path`.
pub fn create_storage_driver(
    storage_type: StorageType,
    path: impl AsRef<Path>,
) -> StorageResult<BoxedStorageDriver> {
    let driver: BoxedStorageDriver = match storage_type {
        StorageType::Memory => Box::new(MemoryStorageDriver::open(path)?),
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => Box::new(sled::SledDriver::open(path)?),
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => {
            return Err(StorageDriverError::Unavailable(format!(
                "sled support is not compiled in (wanted {})",
                path.as_ref().display()
            )))
        }
    };
    log::debug!("Opened {} storage driver", driver.storage_type());
    Ok(driver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_names() {
        assert_eq!("MEMORY".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!(StorageType::Sled.to_string(), "sled");
        assert!(matches!(
            "rocks".parse::<StorageType>(),
            Err(StorageDriverError::Unavailable(_))
        ));
    }

    #[test]
    fn test_memory_driver_ignores_path() {
        let driver = create_storage_driver(StorageType::Memory, "/does/not/exist").unwrap();
        assert_eq!(driver.storage_type(), StorageType::Memory);
    }

    #[cfg(feature = "sled-backend")]
    #[test]
    fn test_sled_driver_in_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let driver = create_storage_driver(StorageType::Sled, dir.path().join("db")).unwrap();
        assert_eq!(driver.storage_type(), StorageType::Sled);
        assert!(driver.list_trees().unwrap().is_empty());
    }
}
