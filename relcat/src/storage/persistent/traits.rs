// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Driver and tree abstractions

use super::{StorageResult, StorageType};
use std::path::Path;

/// Entries of a tree, smallest key first
pub type TreeIter<'a> = Box<dyn Iterator<Item = StorageResult<(Vec<u8>, Vec<u8>)>> + 'a>;

/// Ordered byte map backing a single table
pub trait StorageTree: Send + Sync {
    /// Upsert
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;
    /// Removing an absent key is not an error
    fn remove(&self, key: &[u8]) -> StorageResult<()>;
    fn contains_key(&self, key: &[u8]) -> StorageResult<bool>;
    fn is_empty(&self) -> StorageResult<bool>;
    fn iter(&self) -> StorageResult<TreeIter<'_>>;
    /// Used to resume row id allocation after a reopen
    fn last_key(&self) -> StorageResult<Option<Vec<u8>>>;
    fn flush(&self) -> StorageResult<()>;
}

impl<T: StorageTree + ?Sized> StorageTree for Box<T> {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        T::insert(self, key, value)
    }
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        T::get(self, key)
    }
    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        T::remove(self, key)
    }
    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        T::contains_key(self, key)
    }
    fn is_empty(&self) -> StorageResult<bool> {
        T::is_empty(self)
    }
    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        T::iter(self)
    }
    fn last_key(&self) -> StorageResult<Option<Vec<u8>>> {
        T::last_key(self)
    }
    fn flush(&self) -> StorageResult<()> {
        T::flush(self)
    }
}

/// A backend able to hold many named trees
///
/// Opening the same name twice yields handles over the same data. After
/// `drop_tree` the name is free again and stale handles must not resurrect it.
pub trait StorageDriver: Send + Sync {
    type Tree: StorageTree;

    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Creates the tree on first use
    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree>;
    fn list_trees(&self) -> StorageResult<Vec<String>>;
    fn drop_tree(&self, name: &str) -> StorageResult<()>;
    fn flush(&self) -> StorageResult<()>;
    fn storage_type(&self) -> StorageType;
}

/// Type-erased driver held by the catalog registry
pub type BoxedStorageDriver = Box<dyn StorageDriver<Tree = Box<dyn StorageTree>>>;
