// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog registry implementation
//!
//! This module provides the CatalogRegistry: the directory of every open table
//! (catalog and user tables alike) and the allocator of object identifiers.
//! One registry is built at bootstrap and shared by `Arc` with every catalog.

use super::constants::{FIRST_USER_OID, TABLE_DESCRIPTOR_TREE};
use super::error::{CatalogError, CatalogResult};
use crate::storage::{
    BoxedStorageDriver, DataTable, IndexConstraint, IndexKind, IndexMetadata, Schema,
    StorageTree, StorageType,
};
use crate::txn::{OperationType, TransactionContext};
use crate::types::Oid;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Persisted description of a user table, enough to reopen it
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableDescriptor {
    oid: Oid,
    database_oid: Oid,
    database_name: String,
    name: String,
    schema: Schema,
    indexes: Vec<IndexMetadata>,
}

/// Central directory of tables and OID allocator
pub struct CatalogRegistry {
    driver: BoxedStorageDriver,
    /// Database name used for catalog table trees
    catalog_database_name: String,
    default_index_kind: IndexKind,
    tables: RwLock<HashMap<Oid, Arc<DataTable>>>,
    /// (database oid, table name) -> table oid
    names: RwLock<HashMap<(Oid, String), Oid>>,
    oid_counters: Mutex<HashMap<Oid, Arc<AtomicU32>>>,
    descriptors: Box<dyn StorageTree>,
}

impl CatalogRegistry {
    /// Create a registry over an open storage driver
    ///
    /// # Arguments
    /// * `driver` - Storage driver every table tree is opened from
    /// * `catalog_database_name` - Database name prefixed to catalog table trees
    /// * `default_index_kind` - Index kind recorded when a caller does not choose one
    ///
    /// # Returns
    /// * `Ok(Self)` with no tables registered yet
    /// * `Err(CatalogError::Storage)` if the descriptor tree cannot be opened
    pub fn new(
        driver: BoxedStorageDriver,
        catalog_database_name: impl Into<String>,
        default_index_kind: IndexKind,
    ) -> CatalogResult<Self> {
        let descriptors = driver.open_tree(TABLE_DESCRIPTOR_TREE)?;
        Ok(Self {
            driver,
            catalog_database_name: catalog_database_name.into(),
            default_index_kind,
            tables: RwLock::new(HashMap::new()),
            names: RwLock::new(HashMap::new()),
            oid_counters: Mutex::new(HashMap::new()),
            descriptors,
        })
    }

    pub fn catalog_database_name(&self) -> &str {
        &self.catalog_database_name
    }

    pub fn default_index_kind(&self) -> IndexKind {
        self.default_index_kind
    }

    pub fn storage_type(&self) -> StorageType {
        self.driver.storage_type()
    }

    /// Open (or create) the backing table of a system catalog
    ///
    /// Catalog tables are described by code, so nothing is persisted for them
    /// beyond their rows.
    ///
    /// # Arguments
    /// * `database_oid` - OID of the database owning the table
    /// * `table_oid` - Reserved OID of the catalog table
    /// * `table_name` - Catalog table name, e.g. `pg_trigger`
    /// * `schema` - Column layout; primary key columns get index offset 0
    ///
    /// # Returns
    /// * `Ok(Arc<DataTable>)` registered under `table_oid`
    /// * `Err(CatalogError::InvalidOperation)` if the oid or name is taken
    pub fn create_catalog_table(
        &self,
        database_oid: Oid,
        table_oid: Oid,
        table_name: &str,
        schema: Schema,
    ) -> CatalogResult<Arc<DataTable>> {
        let database_name = self.catalog_database_name.clone();
        self.open_table(database_oid, &database_name, table_oid, table_name, schema)
    }

    /// Create a user table and persist its descriptor
    ///
    /// # Arguments
    /// * `database_oid` / `database_name` - Owning database
    /// * `table_oid` - OID allocated from the table catalog
    /// * `table_name` - Name unique within the database
    /// * `schema` - Column layout
    ///
    /// # Returns
    /// * `Ok(Arc<DataTable>)` on success
    /// * `Err(CatalogError::InvalidOperation)` if the oid or name is taken
    pub fn create_table(
        &self,
        database_oid: Oid,
        database_name: &str,
        table_oid: Oid,
        table_name: &str,
        schema: Schema,
    ) -> CatalogResult<Arc<DataTable>> {
        let table = self.open_table(database_oid, database_name, table_oid, table_name, schema)?;
        self.persist_descriptor(&table, database_name)?;
        info!(
            "Created table {}.{} (oid {})",
            database_name, table_name, table_oid
        );
        Ok(table)
    }

    fn open_table(
        &self,
        database_oid: Oid,
        database_name: &str,
        table_oid: Oid,
        table_name: &str,
        schema: Schema,
    ) -> CatalogResult<Arc<DataTable>> {
        if !table_oid.is_valid() {
            return Err(CatalogError::InvalidParameters(format!(
                "cannot create table '{}' with the invalid oid",
                table_name
            )));
        }
        let key = (database_oid, table_name.to_string());
        if self.tables.read().contains_key(&table_oid) {
            return Err(CatalogError::InvalidOperation(format!(
                "table oid {} is already registered",
                table_oid
            )));
        }
        if self.names.read().contains_key(&key) {
            return Err(CatalogError::InvalidOperation(format!(
                "table '{}' already exists in database {}",
                table_name, database_oid
            )));
        }

        let tree = self
            .driver
            .open_tree(&tree_name(database_name, table_name))?;
        let pk_columns = schema.primary_key_columns();
        let table = DataTable::open(table_oid, database_oid, table_name, schema, tree)?;
        if !pk_columns.is_empty() {
            table.add_index(IndexMetadata {
                name: format!("{}_pkey", table_name),
                key_columns: pk_columns,
                constraint: IndexConstraint::PrimaryKey,
                kind: self.default_index_kind,
            })?;
        }

        let table = Arc::new(table);
        self.tables.write().insert(table_oid, Arc::clone(&table));
        self.names.write().insert(key, table_oid);
        debug!("Registered table '{}' (oid {})", table_name, table_oid);
        Ok(table)
    }

    /// Register one secondary index on an existing table
    ///
    /// # Arguments
    /// * `table_oid` - Table to index
    /// * `column_ids` - Key columns, in key order
    /// * `index_name` - Name unique within the table
    /// * `unique` - Reject duplicate keys among visible and in-flight rows
    /// * `index_kind` - Physical structure to record
    /// * `txn` - Active transaction performing the change
    ///
    /// # Returns
    /// * `Ok(usize)` - Offset of the new index
    /// * `Err(CatalogError::InvalidOperation)` if the table's index set is sealed
    /// * `Err(CatalogError::NotFound)` if the table does not exist
    pub fn create_index(
        &self,
        table_oid: Oid,
        column_ids: Vec<usize>,
        index_name: &str,
        unique: bool,
        index_kind: IndexKind,
        txn: &TransactionContext,
    ) -> CatalogResult<usize> {
        if !txn.is_active() {
            return Err(CatalogError::InvalidTransaction(txn.id()));
        }
        if column_ids.is_empty() {
            return Err(CatalogError::InvalidParameters(format!(
                "index '{}' needs at least one key column",
                index_name
            )));
        }
        let table = self
            .get_table(table_oid)
            .ok_or_else(|| CatalogError::NotFound(format!("table oid {}", table_oid)))?;

        let offset = table.add_index(IndexMetadata {
            name: index_name.to_string(),
            key_columns: column_ids,
            constraint: if unique {
                IndexConstraint::Unique
            } else {
                IndexConstraint::Default
            },
            kind: index_kind,
        })?;
        txn.record_operation(
            OperationType::CreateIndex,
            format!("{} on {}", index_name, table.name()),
        );

        if self.descriptors.contains_key(&table_oid.as_u32().to_be_bytes())? {
            let database_name = self.descriptor(table_oid)?.map(|d| d.database_name);
            if let Some(database_name) = database_name {
                self.persist_descriptor(&table, &database_name)?;
            }
        }
        debug!(
            "Created index '{}' at offset {} on '{}'",
            index_name,
            offset,
            table.name()
        );
        Ok(offset)
    }

    /// Allocate a fresh OID for a row of `table_oid`
    ///
    /// The counter is seeded from the largest OID stored in column 0 of the
    /// table, so identifiers are never reused across restarts.
    ///
    /// # Returns
    /// * `Ok(Oid)` - Strictly greater than every OID previously handed out
    /// * `Err(CatalogError::NotFound)` if the table does not exist
    /// * `Err(CatalogError::InvariantViolation)` if the OID space is exhausted
    pub fn next_oid(&self, table_oid: Oid) -> CatalogResult<Oid> {
        let counter = {
            let mut counters = self.oid_counters.lock();
            match counters.get(&table_oid) {
                Some(counter) => Arc::clone(counter),
                None => {
                    let table = self.get_table(table_oid).ok_or_else(|| {
                        CatalogError::NotFound(format!("table oid {}", table_oid))
                    })?;
                    let seed = match table.max_integer(0)? {
                        Some(max) => u32::try_from(max + 1)
                            .unwrap_or(u32::MAX)
                            .max(FIRST_USER_OID),
                        None => FIRST_USER_OID,
                    };
                    let counter = Arc::new(AtomicU32::new(seed));
                    counters.insert(table_oid, Arc::clone(&counter));
                    counter
                }
            }
        };

        let oid = Oid::new(counter.fetch_add(1, Ordering::SeqCst));
        if !oid.is_valid() {
            counter.store(u32::MAX, Ordering::SeqCst);
            return Err(CatalogError::InvariantViolation(format!(
                "oid space of table {} is exhausted",
                table_oid
            )));
        }
        Ok(oid)
    }

    /// Freeze the index set of a table
    pub fn seal(&self, table_oid: Oid) -> CatalogResult<()> {
        let table = self
            .get_table(table_oid)
            .ok_or_else(|| CatalogError::NotFound(format!("table oid {}", table_oid)))?;
        table.seal_indexes();
        Ok(())
    }

    pub fn get_table(&self, table_oid: Oid) -> Option<Arc<DataTable>> {
        self.tables.read().get(&table_oid).cloned()
    }

    pub fn table_by_name(&self, database_oid: Oid, table_name: &str) -> Option<Arc<DataTable>> {
        let oid = self
            .names
            .read()
            .get(&(database_oid, table_name.to_string()))
            .copied()?;
        self.get_table(oid)
    }

    /// Every registered table, ordered by oid
    pub fn tables(&self) -> Vec<Arc<DataTable>> {
        let mut tables: Vec<_> = self.tables.read().values().cloned().collect();
        tables.sort_by_key(|t| t.oid());
        tables
    }

    /// Unregister a table and drop its storage
    ///
    /// Storage is released immediately; it is not rolled back with the
    /// caller's transaction.
    ///
    /// # Returns
    /// * `Ok(Arc<DataTable>)` - The handle that was removed
    /// * `Err(CatalogError::NotFound)` if the table does not exist
    pub fn drop_table(&self, table_oid: Oid) -> CatalogResult<Arc<DataTable>> {
        let table = self
            .tables
            .write()
            .remove(&table_oid)
            .ok_or_else(|| CatalogError::NotFound(format!("table oid {}", table_oid)))?;
        self.names
            .write()
            .remove(&(table.database_oid(), table.name().to_string()));
        self.oid_counters.lock().remove(&table_oid);

        let database_name = self
            .descriptor(table_oid)?
            .map(|d| d.database_name)
            .unwrap_or_else(|| self.catalog_database_name.clone());
        self.descriptors.remove(&table_oid.as_u32().to_be_bytes())?;
        self.driver
            .drop_tree(&tree_name(&database_name, table.name()))?;
        info!("Dropped table '{}' (oid {})", table.name(), table_oid);
        Ok(table)
    }

    /// Reopen every user table recorded by a previous run
    ///
    /// # Returns
    /// * `Ok(Vec<Arc<DataTable>>)` - Tables attached, with their indexes rebuilt
    pub fn attach_persisted_tables(&self) -> CatalogResult<Vec<Arc<DataTable>>> {
        let mut descriptors = Vec::new();
        for entry in self.descriptors.iter()? {
            let (_, bytes) = entry?;
            descriptors.push(bincode::deserialize::<TableDescriptor>(&bytes)?);
        }

        let mut attached = Vec::new();
        for descriptor in descriptors {
            if self.tables.read().contains_key(&descriptor.oid) {
                continue;
            }
            let table = self.open_table(
                descriptor.database_oid,
                &descriptor.database_name,
                descriptor.oid,
                &descriptor.name,
                descriptor.schema,
            )?;
            for index in descriptor.indexes {
                if table.index_offset(&index.name).is_none() {
                    table.add_index(index)?;
                }
            }
            attached.push(table);
        }
        if !attached.is_empty() {
            info!("Attached {} persisted table(s)", attached.len());
        }
        Ok(attached)
    }

    /// Names of every tree in the underlying storage
    pub fn list_trees(&self) -> CatalogResult<Vec<String>> {
        Ok(self.driver.list_trees()?)
    }

    pub fn flush(&self) -> CatalogResult<()> {
        self.driver.flush()?;
        Ok(())
    }

    fn descriptor(&self, table_oid: Oid) -> CatalogResult<Option<TableDescriptor>> {
        match self.descriptors.get(&table_oid.as_u32().to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn persist_descriptor(&self, table: &DataTable, database_name: &str) -> CatalogResult<()> {
        let descriptor = TableDescriptor {
            oid: table.oid(),
            database_oid: table.database_oid(),
            database_name: database_name.to_string(),
            name: table.name().to_string(),
            schema: table.schema().clone(),
            indexes: table.indexes(),
        };
        self.descriptors.insert(
            &table.oid().as_u32().to_be_bytes(),
            &bincode::serialize(&descriptor)?,
        )?;
        Ok(())
    }
}

fn tree_name(database_name: &str, table_name: &str) -> String {
    format!("{}.{}", database_name, table_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Column, MemoryStorageDriver, Tuple};
    use crate::txn::{AccessMode, TransactionManager};
    use crate::types::{TypeId, Value};

    fn registry() -> CatalogRegistry {
        CatalogRegistry::new(
            Box::new(MemoryStorageDriver::default()),
            "pg_catalog",
            IndexKind::BwTree,
        )
        .unwrap()
    }

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("oid", TypeId::Integer).primary_key(),
            Column::new("name", TypeId::Varchar).not_null(),
        ])
    }

    #[test]
    fn test_next_oid_seeds_from_stored_rows() {
        let registry = registry();
        let table = registry
            .create_catalog_table(Oid::new(1), Oid::new(20), "t", schema())
            .unwrap();
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadWrite);
        table
            .insert_tuple(
                Tuple::from_values(vec![Value::Integer(4200), Value::from("x")]),
                &txn,
            )
            .unwrap();
        manager.commit(&txn).unwrap();

        assert_eq!(registry.next_oid(Oid::new(20)).unwrap(), Oid::new(4201));
        assert_eq!(registry.next_oid(Oid::new(20)).unwrap(), Oid::new(4202));
    }

    #[test]
    fn test_next_oid_starts_at_first_user_oid() {
        let registry = registry();
        registry
            .create_catalog_table(Oid::new(1), Oid::new(20), "t", schema())
            .unwrap();
        assert_eq!(
            registry.next_oid(Oid::new(20)).unwrap(),
            Oid::new(FIRST_USER_OID)
        );
        assert!(matches!(
            registry.next_oid(Oid::new(99)),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_index_fails_after_seal() {
        let registry = registry();
        registry
            .create_catalog_table(Oid::new(1), Oid::new(20), "t", schema())
            .unwrap();
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadWrite);

        let offset = registry
            .create_index(Oid::new(20), vec![1], "t_skey0", true, IndexKind::BwTree, &txn)
            .unwrap();
        assert_eq!(offset, 1);

        registry.seal(Oid::new(20)).unwrap();
        let err = registry
            .create_index(Oid::new(20), vec![1], "t_skey1", false, IndexKind::BwTree, &txn)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOperation(_)));
    }

    #[test]
    fn test_duplicate_table_name_rejected() {
        let registry = registry();
        registry
            .create_table(Oid::new(1000), "app", Oid::new(2000), "users", schema())
            .unwrap();
        let err = registry
            .create_table(Oid::new(1000), "app", Oid::new(2001), "users", schema())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOperation(_)));
        assert!(registry.table_by_name(Oid::new(1000), "users").is_some());
    }

    #[test]
    fn test_drop_table_releases_name_and_tree() {
        let registry = registry();
        registry
            .create_table(Oid::new(1000), "app", Oid::new(2000), "users", schema())
            .unwrap();
        assert!(registry.list_trees().unwrap().contains(&"app.users".to_string()));

        registry.drop_table(Oid::new(2000)).unwrap();
        assert!(registry.table_by_name(Oid::new(1000), "users").is_none());
        assert!(!registry.list_trees().unwrap().contains(&"app.users".to_string()));
        assert!(registry.attach_persisted_tables().unwrap().is_empty());
    }
}
