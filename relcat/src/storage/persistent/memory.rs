// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Volatile driver used by `CatalogConfig::in_memory` and most tests

use super::traits::{StorageDriver, StorageTree, TreeIter};
use super::{StorageResult, StorageType};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

#[derive(Default)]
pub struct MemoryStorageDriver {
    trees: RwLock<HashMap<String, Arc<RwLock<Entries>>>>,
}

/// Handle onto one named map; clones of the map are shared with the driver
pub struct MemoryTree {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryStorageDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageTree for MemoryTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.entries.read().is_empty())
    }

    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        // copy out so a scan never holds the lock across caller code
        let snapshot: Vec<(Vec<u8>, Vec<u8>)> = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }

    fn last_key(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self
            .entries
            .read()
            .last_key_value()
            .map(|(k, _)| k.clone()))
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageDriver for MemoryStorageDriver {
    type Tree = Box<dyn StorageTree>;

    fn open<P: AsRef<Path>>(_path: P) -> StorageResult<Self> {
        Ok(Self::new())
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let entries = Arc::clone(self.trees.write().entry(name.to_owned()).or_default());
        Ok(Box::new(MemoryTree { entries }))
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        let mut names: Vec<String> = self.trees.read().keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }

    fn drop_tree(&self, name: &str) -> StorageResult<()> {
        let removed = self.trees.write().remove(name);
        if let Some(entries) = removed {
            // outstanding handles see an empty tree
            entries.write().clear();
        }
        Ok(())
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}
