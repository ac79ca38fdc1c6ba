// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! sled-backed driver for `CatalogConfig::persistent`

use super::traits::{StorageDriver, StorageTree, TreeIter};
use super::{StorageDriverError, StorageResult, StorageType};
use std::path::Path;

/// Name sled gives the tree every database starts with
const SLED_DEFAULT_TREE: &[u8] = b"__sled__default";

impl From<sled::Error> for StorageDriverError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(io) => StorageDriverError::IoError(io),
            other => StorageDriverError::BackendSpecific(other.to_string()),
        }
    }
}

pub struct SledDriver {
    db: sled::Db,
}

pub struct SledTree(sled::Tree);

impl StorageTree for SledTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.0.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.0.get(key)?.map(|bytes| bytes.to_vec()))
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        self.0.remove(key)?;
        Ok(())
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.0.contains_key(key)?)
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.0.is_empty())
    }

    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        Ok(Box::new(self.0.iter().map(|entry| -> StorageResult<(Vec<u8>, Vec<u8>)> {
            let (key, value) = entry?;
            Ok((key.to_vec(), value.to_vec()))
        })))
    }

    fn last_key(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.0.last()?.map(|(key, _)| key.to_vec()))
    }

    fn flush(&self) -> StorageResult<()> {
        self.0.flush()?;
        Ok(())
    }
}

impl StorageDriver for SledDriver {
    type Tree = Box<dyn StorageTree>;

    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path.as_ref())?;
        log::info!(
            "Opened sled database at {} (recovered: {})",
            path.as_ref().display(),
            db.was_recovered()
        );
        Ok(SledDriver { db })
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        Ok(Box::new(SledTree(self.db.open_tree(name)?)))
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .db
            .tree_names()
            .into_iter()
            .filter(|name| &name[..] != SLED_DEFAULT_TREE)
            .map(|name| String::from_utf8_lossy(&name).into_owned())
            .collect())
    }

    fn drop_tree(&self, name: &str) -> StorageResult<()> {
        self.db.drop_tree(name)?;
        Ok(())
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_trees_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let driver = SledDriver::open(dir.path()).unwrap();
            let tree = driver.open_tree("pg_table").unwrap();
            tree.insert(&7u64.to_be_bytes(), b"row").unwrap();
            driver.flush().unwrap();
        }
        let driver = SledDriver::open(dir.path()).unwrap();
        assert_eq!(driver.list_trees().unwrap(), vec!["pg_table".to_string()]);
        let tree = driver.open_tree("pg_table").unwrap();
        assert_eq!(tree.last_key().unwrap(), Some(7u64.to_be_bytes().to_vec()));
    }
}
