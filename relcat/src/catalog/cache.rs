// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-transaction cache of materialized catalog objects
//!
//! Lives inside a [`TransactionContext`](crate::txn::TransactionContext) and is
//! dropped with it, so cached objects never outlive the snapshot they were
//! read under. Table objects hang off their database: evicting a database
//! evicts its tables too.

use super::providers::database::DatabaseCatalogObject;
use super::providers::table::TableCatalogObject;
use crate::types::Oid;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct CatalogCache {
    databases: RwLock<HashMap<Oid, Arc<DatabaseCatalogObject>>>,
    database_names: RwLock<HashMap<String, Oid>>,
    tables: RwLock<HashMap<Oid, Arc<TableCatalogObject>>>,
    /// (database oid, table name) -> table oid
    table_names: RwLock<HashMap<(Oid, String), Oid>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CatalogCache {
    /// Returns false if an object with the same oid was already cached
    pub fn insert_database(&self, object: Arc<DatabaseCatalogObject>) -> bool {
        let mut databases = self.databases.write();
        if databases.contains_key(&object.database_oid) {
            return false;
        }
        self.database_names
            .write()
            .insert(object.database_name.clone(), object.database_oid);
        databases.insert(object.database_oid, object);
        true
    }

    pub fn get_database(&self, oid: Oid) -> Option<Arc<DatabaseCatalogObject>> {
        let found = self.databases.read().get(&oid).cloned();
        self.count(found.is_some());
        found
    }

    pub fn get_database_by_name(&self, name: &str) -> Option<Arc<DatabaseCatalogObject>> {
        let oid = self.database_names.read().get(name).copied();
        let found = oid.and_then(|oid| self.databases.read().get(&oid).cloned());
        self.count(found.is_some());
        found
    }

    /// Returns false if nothing was cached under `oid`
    pub fn evict_database(&self, oid: Oid) -> bool {
        self.evict_tables_of_database(oid);
        match self.databases.write().remove(&oid) {
            Some(object) => {
                self.database_names.write().remove(&object.database_name);
                true
            }
            None => false,
        }
    }

    /// Returns false if an object with the same oid was already cached
    pub fn insert_table(&self, object: Arc<TableCatalogObject>) -> bool {
        let mut tables = self.tables.write();
        if tables.contains_key(&object.table_oid) {
            return false;
        }
        self.table_names.write().insert(
            (object.database_oid, object.table_name.clone()),
            object.table_oid,
        );
        tables.insert(object.table_oid, object);
        true
    }

    pub fn get_table(&self, oid: Oid) -> Option<Arc<TableCatalogObject>> {
        let found = self.tables.read().get(&oid).cloned();
        self.count(found.is_some());
        found
    }

    pub fn get_table_by_name(
        &self,
        database_oid: Oid,
        table_name: &str,
    ) -> Option<Arc<TableCatalogObject>> {
        let oid = self
            .table_names
            .read()
            .get(&(database_oid, table_name.to_string()))
            .copied();
        let found = oid.and_then(|oid| self.tables.read().get(&oid).cloned());
        self.count(found.is_some());
        found
    }

    /// Cached tables of one database, ordered by oid; never scans
    pub fn tables_of_database(&self, database_oid: Oid) -> Vec<Arc<TableCatalogObject>> {
        let mut tables: Vec<_> = self
            .tables
            .read()
            .values()
            .filter(|t| t.database_oid == database_oid)
            .cloned()
            .collect();
        tables.sort_by_key(|t| t.table_oid);
        tables
    }

    /// Returns false if nothing was cached under `oid`
    pub fn evict_table(&self, oid: Oid) -> bool {
        match self.tables.write().remove(&oid) {
            Some(object) => {
                self.table_names
                    .write()
                    .remove(&(object.database_oid, object.table_name.clone()));
                true
            }
            None => false,
        }
    }

    /// Number of table objects evicted
    pub fn evict_tables_of_database(&self, database_oid: Oid) -> usize {
        let mut tables = self.tables.write();
        let before = tables.len();
        tables.retain(|_, t| t.database_oid != database_oid);
        self.table_names
            .write()
            .retain(|(db, _), _| *db != database_oid);
        before - tables.len()
    }

    pub fn clear(&self) {
        self.databases.write().clear();
        self.database_names.write().clear();
        self.tables.write().clear();
        self.table_names.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn count(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
