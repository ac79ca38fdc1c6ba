// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transactional row table over a single storage tree
//!
//! Rows are keyed by a big-endian [`RowId`] so tree iteration order equals
//! insertion order. Each stored value is a bincode-encoded [`StoredTuple`]
//! followed by a little-endian crc32 of the encoded bytes.
//!
//! A row version carries the id of the transaction that created it (until that
//! transaction commits) and the id of the transaction that deleted it (until
//! that transaction commits, at which point the row is physically removed).

use super::index::{IndexMetadata, SecondaryIndex};
use super::persistent::StorageTree;
use super::schema::Schema;
use super::tuple::Tuple;
use super::types::{RowId, StorageError};
use crate::catalog::traits::TriggerCacheInvalidation;
use crate::trigger::TriggerList;
use crate::txn::{TransactionContext, TransactionId, WriteRecord};
use crate::types::{Oid, Value};
use log::{debug, trace, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

const CHECKSUM_LEN: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTuple {
    values: Vec<Value>,
    created_by: Option<TransactionId>,
    deleted_by: Option<TransactionId>,
}

impl StoredTuple {
    /// Committed rows plus the reader's own uncommitted writes
    fn is_visible_to(&self, txn_id: TransactionId) -> bool {
        let created = self.created_by.map_or(true, |id| id == txn_id);
        let deleted = self.deleted_by.map_or(false, |id| id == txn_id);
        created && !deleted
    }
}

/// Trigger lists cached on a table: the committed one plus one staged list
/// per transaction that changed the table's triggers
#[derive(Debug, Default)]
struct TriggerCache {
    committed: Option<TriggerList>,
    /// Bumped on every publish or invalidation
    version: u64,
    staged: HashMap<TransactionId, (u64, TriggerList)>,
}

fn row_key(row_id: RowId) -> [u8; 8] {
    row_id.to_be_bytes()
}

/// A table of fixed-arity rows with secondary indexes
pub struct DataTable {
    oid: Oid,
    database_oid: Oid,
    name: String,
    schema: Schema,
    tree: Box<dyn StorageTree>,
    indexes: RwLock<Vec<SecondaryIndex>>,
    indexes_sealed: AtomicBool,
    next_row_id: AtomicU64,
    /// Serializes unique checks with the writes they guard
    write_lock: Mutex<()>,
    triggers: RwLock<TriggerCache>,
}

impl std::fmt::Debug for DataTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable")
            .field("oid", &self.oid)
            .field("database_oid", &self.database_oid)
            .field("name", &self.name)
            .field("columns", &self.schema.column_count())
            .finish()
    }
}

impl DataTable {
    /// Open a table over `tree`, discarding row versions left behind by
    /// transactions that never finished.
    pub fn open(
        oid: Oid,
        database_oid: Oid,
        name: impl Into<String>,
        schema: Schema,
        tree: Box<dyn StorageTree>,
    ) -> Result<Self, StorageError> {
        let name = name.into();
        let next_row_id = match tree.last_key()? {
            Some(key) => decode_row_id(&name, &key)? + 1,
            None => 0,
        };

        let table = Self {
            oid,
            database_oid,
            name,
            schema,
            tree,
            indexes: RwLock::new(Vec::new()),
            indexes_sealed: AtomicBool::new(false),
            next_row_id: AtomicU64::new(next_row_id),
            write_lock: Mutex::new(()),
            triggers: RwLock::new(TriggerCache::default()),
        };
        table.recover_in_flight()?;
        debug!(
            "Opened table '{}' (oid {}), next row id {}",
            table.name, table.oid, next_row_id
        );
        Ok(table)
    }

    fn recover_in_flight(&self) -> Result<(), StorageError> {
        let mut discarded = 0usize;
        for (row_id, mut stored) in self.load_all()? {
            if stored.created_by.is_some() {
                self.tree.remove(&row_key(row_id))?;
                discarded += 1;
            } else if stored.deleted_by.is_some() {
                stored.deleted_by = None;
                self.store(row_id, &stored)?;
            }
        }
        if discarded > 0 {
            warn!(
                "Discarded {} uncommitted row(s) from table '{}'",
                discarded, self.name
            );
        }
        Ok(())
    }

    pub fn oid(&self) -> Oid {
        self.oid
    }

    pub fn database_oid(&self) -> Oid {
        self.database_oid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    // ----- indexes -----

    /// Register a new index and build it over the rows already stored.
    /// Returns the index offset.
    pub fn add_index(&self, metadata: IndexMetadata) -> Result<usize, StorageError> {
        if self.is_sealed() {
            return Err(StorageError::IndexesSealed(self.name.clone()));
        }
        if let Some(&bad) = metadata
            .key_columns
            .iter()
            .find(|&&c| c >= self.schema.column_count())
        {
            return Err(StorageError::SchemaMismatch(format!(
                "index '{}' references column {} but table '{}' has {} columns",
                metadata.name,
                bad,
                self.name,
                self.schema.column_count()
            )));
        }

        let _guard = self.write_lock.lock();
        let mut indexes = self.indexes.write();
        if indexes.iter().any(|i| i.metadata.name == metadata.name) {
            return Err(StorageError::DuplicateIndex(metadata.name));
        }

        let mut index = SecondaryIndex::new(metadata);
        for (row_id, stored) in self.load_all()? {
            index.insert(&stored.values, row_id);
        }
        trace!(
            "Built index '{}' on table '{}'",
            index.metadata.name,
            self.name
        );
        indexes.push(index);
        Ok(indexes.len() - 1)
    }

    /// Freeze the index set; later `add_index` calls fail
    pub fn seal_indexes(&self) {
        self.indexes_sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.indexes_sealed.load(Ordering::Acquire)
    }

    pub fn index_count(&self) -> usize {
        self.indexes.read().len()
    }

    pub fn index_metadata(&self, offset: usize) -> Option<IndexMetadata> {
        self.indexes.read().get(offset).map(|i| i.metadata.clone())
    }

    pub fn index_offset(&self, name: &str) -> Option<usize> {
        self.indexes
            .read()
            .iter()
            .position(|i| i.metadata.name == name)
    }

    pub fn indexes(&self) -> Vec<IndexMetadata> {
        self.indexes
            .read()
            .iter()
            .map(|i| i.metadata.clone())
            .collect()
    }

    // ----- row operations -----

    /// Insert a row as an uncommitted version owned by `txn`
    pub fn insert_tuple(
        self: &Arc<Self>,
        tuple: Tuple,
        txn: &TransactionContext,
    ) -> Result<RowId, StorageError> {
        let values = self.schema.conform(tuple.into_values())?;
        let txn_id = txn.id();

        let _guard = self.write_lock.lock();
        let mut indexes = self.indexes.write();
        self.check_unique(&indexes, &values, txn_id)?;

        let row_id = self.next_row_id.fetch_add(1, Ordering::SeqCst);
        let stored = StoredTuple {
            values,
            created_by: Some(txn_id),
            deleted_by: None,
        };
        self.store(row_id, &stored)?;
        for index in indexes.iter_mut() {
            index.insert(&stored.values, row_id);
        }
        txn.record_write(WriteRecord::insert(Arc::clone(self), row_id));
        trace!("{} inserted row {} into '{}'", txn_id, row_id, self.name);
        Ok(row_id)
    }

    /// Mark a visible row as deleted by `txn`. Returns false when the row is
    /// absent or not visible.
    pub fn delete_tuple(
        self: &Arc<Self>,
        row_id: RowId,
        txn: &TransactionContext,
    ) -> Result<bool, StorageError> {
        let txn_id = txn.id();
        let _guard = self.write_lock.lock();
        let Some(mut stored) = self.load(row_id)? else {
            return Ok(false);
        };
        if !stored.is_visible_to(txn_id) {
            return Ok(false);
        }
        if stored.deleted_by.is_some() {
            return Err(StorageError::WriteConflict {
                table: self.name.clone(),
                row_id,
            });
        }
        stored.deleted_by = Some(txn_id);
        self.store(row_id, &stored)?;
        txn.record_write(WriteRecord::delete(Arc::clone(self), row_id));
        trace!("{} deleted row {} from '{}'", txn_id, row_id, self.name);
        Ok(true)
    }

    /// All rows visible to `txn`, in row-id order
    pub fn scan(&self, txn: &TransactionContext) -> Result<Vec<(RowId, Vec<Value>)>, StorageError> {
        let txn_id = txn.id();
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|(_, stored)| stored.is_visible_to(txn_id))
            .map(|(row_id, stored)| (row_id, stored.values))
            .collect())
    }

    /// Row ids visible to `txn` whose key under index `offset` equals `key`
    pub fn index_scan(
        &self,
        offset: usize,
        key: &[Value],
        txn: &TransactionContext,
    ) -> Result<Vec<RowId>, StorageError> {
        let indexes = self.indexes.read();
        let index = indexes.get(offset).ok_or_else(|| {
            StorageError::IndexNotFound(format!("offset {} on table '{}'", offset, self.name))
        })?;
        if key.len() != index.metadata.key_columns.len() {
            return Err(StorageError::SchemaMismatch(format!(
                "index '{}' expects {} key values, got {}",
                index.metadata.name,
                index.metadata.key_columns.len(),
                key.len()
            )));
        }

        let mut lookup_key = Vec::with_capacity(key.len());
        for (value, &column_id) in key.iter().zip(&index.metadata.key_columns) {
            let column = &self.schema.columns()[column_id];
            let value = value.cast_to(column.type_id).map_err(|e| {
                StorageError::SchemaMismatch(format!("column '{}': {}", column.name, e))
            })?;
            lookup_key.push(value);
        }

        let txn_id = txn.id();
        let mut visible = Vec::new();
        for row_id in index.lookup(&lookup_key) {
            if let Some(stored) = self.load(row_id)? {
                if stored.is_visible_to(txn_id) {
                    visible.push(row_id);
                }
            }
        }
        Ok(visible)
    }

    /// Largest integral value stored in `column_id` across every version
    pub fn max_integer(&self, column_id: usize) -> Result<Option<i64>, StorageError> {
        Ok(self
            .load_all()?
            .iter()
            .filter_map(|(_, stored)| stored.values.get(column_id).and_then(Value::as_i64))
            .max())
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.tree.flush()?;
        Ok(())
    }

    // ----- transaction finalization -----

    pub(crate) fn commit_insert(&self, row_id: RowId, txn_id: TransactionId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        if let Some(mut stored) = self.load(row_id)? {
            if stored.created_by == Some(txn_id) {
                stored.created_by = None;
                self.store(row_id, &stored)?;
            }
        }
        Ok(())
    }

    pub(crate) fn commit_delete(&self, row_id: RowId, txn_id: TransactionId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        if let Some(stored) = self.load(row_id)? {
            if stored.deleted_by == Some(txn_id) {
                self.purge(row_id, &stored)?;
            }
        }
        Ok(())
    }

    pub(crate) fn abort_insert(&self, row_id: RowId, txn_id: TransactionId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        if let Some(stored) = self.load(row_id)? {
            if stored.created_by == Some(txn_id) {
                self.purge(row_id, &stored)?;
            }
        }
        Ok(())
    }

    pub(crate) fn abort_delete(&self, row_id: RowId, txn_id: TransactionId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        if let Some(mut stored) = self.load(row_id)? {
            if stored.deleted_by == Some(txn_id) {
                stored.deleted_by = None;
                self.store(row_id, &stored)?;
            }
        }
        Ok(())
    }

    // ----- trigger cache -----

    /// Committed trigger list, or `None` until the trigger catalog publishes one
    pub fn trigger_list(&self) -> Option<TriggerList> {
        self.triggers.read().committed.clone()
    }

    /// Trigger list as `txn` sees it: its staged list if it changed the
    /// table's triggers, the committed list otherwise
    pub fn trigger_list_for(&self, txn: &TransactionContext) -> Option<TriggerList> {
        let cache = self.triggers.read();
        match cache.staged.get(&txn.id()) {
            Some((_, staged)) => Some(staged.clone()),
            None => cache.committed.clone(),
        }
    }

    // ----- internals -----

    fn check_unique(
        &self,
        indexes: &[SecondaryIndex],
        values: &[Value],
        txn_id: TransactionId,
    ) -> Result<(), StorageError> {
        for index in indexes.iter().filter(|i| i.metadata.is_unique()) {
            let key = index.key_of(values);
            if key.iter().any(Value::is_null) {
                continue;
            }
            for row_id in index.lookup(&key) {
                let Some(existing) = self.load(row_id)? else {
                    continue;
                };
                match (existing.created_by, existing.deleted_by) {
                    (_, Some(deleter)) if deleter == txn_id => continue,
                    (_, Some(_)) => {
                        return Err(StorageError::WriteConflict {
                            table: self.name.clone(),
                            row_id,
                        })
                    }
                    (Some(creator), None) if creator != txn_id => {
                        return Err(StorageError::WriteConflict {
                            table: self.name.clone(),
                            row_id,
                        })
                    }
                    _ => {
                        return Err(StorageError::UniqueViolation {
                            index: index.metadata.name.clone(),
                            key: format_key(&key),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    fn purge(&self, row_id: RowId, stored: &StoredTuple) -> Result<(), StorageError> {
        self.tree.remove(&row_key(row_id))?;
        for index in self.indexes.write().iter_mut() {
            index.remove(&stored.values, row_id);
        }
        Ok(())
    }

    fn store(&self, row_id: RowId, stored: &StoredTuple) -> Result<(), StorageError> {
        let mut bytes = bincode::serialize(stored)?;
        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());
        self.tree.insert(&row_key(row_id), &bytes)?;
        Ok(())
    }

    fn load(&self, row_id: RowId) -> Result<Option<StoredTuple>, StorageError> {
        match self.tree.get(&row_key(row_id))? {
            Some(bytes) => self.decode(row_id, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> Result<Vec<(RowId, StoredTuple)>, StorageError> {
        let mut rows = Vec::new();
        for entry in self.tree.iter()? {
            let (key, bytes) = entry?;
            let row_id = decode_row_id(&self.name, &key)?;
            rows.push((row_id, self.decode(row_id, &bytes)?));
        }
        Ok(rows)
    }

    fn decode(&self, row_id: RowId, bytes: &[u8]) -> Result<StoredTuple, StorageError> {
        if bytes.len() < CHECKSUM_LEN {
            return Err(self.corrupted(row_id, "row shorter than its checksum"));
        }
        let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        let mut expected = [0u8; CHECKSUM_LEN];
        expected.copy_from_slice(checksum);
        if crc32fast::hash(payload) != u32::from_le_bytes(expected) {
            return Err(self.corrupted(row_id, "checksum mismatch"));
        }
        Ok(bincode::deserialize(payload)?)
    }

    fn corrupted(&self, row_id: RowId, reason: &str) -> StorageError {
        StorageError::Corrupted {
            table: self.name.clone(),
            row_id,
            reason: reason.to_string(),
        }
    }
}

impl TriggerCacheInvalidation for DataTable {
    fn stage_triggers(&self, txn_id: TransactionId, triggers: TriggerList) -> bool {
        let mut cache = self.triggers.write();
        let version = cache.version;
        trace!(
            "{} staged {} trigger(s) on table '{}'",
            txn_id,
            triggers.len(),
            self.name
        );
        cache.staged.insert(txn_id, (version, triggers)).is_none()
    }

    fn publish_triggers(&self, txn_id: TransactionId) {
        let mut cache = self.triggers.write();
        let Some((seen, triggers)) = cache.staged.remove(&txn_id) else {
            return;
        };
        if seen == cache.version {
            debug!(
                "Refreshed trigger cache of table '{}' ({} trigger(s))",
                self.name,
                triggers.len()
            );
            cache.committed = Some(triggers);
        } else {
            debug!(
                "Trigger cache of table '{}' changed under {}, invalidating",
                self.name, txn_id
            );
            cache.committed = None;
        }
        cache.version += 1;
    }

    fn discard_triggers(&self, txn_id: TransactionId) {
        self.triggers.write().staged.remove(&txn_id);
    }

    fn invalidate_triggers(&self) {
        let mut cache = self.triggers.write();
        cache.committed = None;
        cache.version += 1;
    }
}

fn decode_row_id(table: &str, key: &[u8]) -> Result<RowId, StorageError> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| StorageError::Corrupted {
        table: table.to_string(),
        row_id: 0,
        reason: format!("row key of {} bytes", key.len()),
    })?;
    Ok(RowId::from_be_bytes(bytes))
}

fn format_key(key: &[Value]) -> String {
    let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::index::{IndexConstraint, IndexKind};
    use crate::storage::persistent::{MemoryStorageDriver, StorageDriver};
    use crate::storage::schema::Column;
    use crate::txn::{AccessMode, TransactionManager};
    use crate::types::TypeId;

    fn open_table(driver: &MemoryStorageDriver) -> Arc<DataTable> {
        let schema = Schema::new(vec![
            Column::new("id", TypeId::Integer).primary_key(),
            Column::new("name", TypeId::Varchar).not_null(),
        ]);
        let tree = driver.open_tree("db.t").unwrap();
        let table = DataTable::open(Oid::new(50), Oid::new(1), "t", schema, tree).unwrap();
        table
            .add_index(IndexMetadata {
                name: "t_pkey".to_string(),
                key_columns: vec![0],
                constraint: IndexConstraint::PrimaryKey,
                kind: IndexKind::BwTree,
            })
            .unwrap();
        Arc::new(table)
    }

    fn row(id: i32, name: &str) -> Tuple {
        Tuple::from_values(vec![Value::Integer(id), Value::from(name)])
    }

    #[test]
    fn test_uncommitted_insert_visible_only_to_owner() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();

        let writer = manager.begin(AccessMode::ReadWrite);
        let reader = manager.begin(AccessMode::ReadOnly);
        table.insert_tuple(row(1, "a"), &writer).unwrap();

        assert_eq!(table.scan(&writer).unwrap().len(), 1);
        assert!(table.scan(&reader).unwrap().is_empty());

        manager.commit(&writer).unwrap();
        assert_eq!(table.scan(&reader).unwrap().len(), 1);
    }

    #[test]
    fn test_primary_key_rejects_duplicate() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();

        let txn = manager.begin(AccessMode::ReadWrite);
        table.insert_tuple(row(1, "a"), &txn).unwrap();
        manager.commit(&txn).unwrap();

        let txn = manager.begin(AccessMode::ReadWrite);
        let err = table.insert_tuple(row(1, "b"), &txn).unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { .. }));
    }

    #[test]
    fn test_concurrent_duplicate_is_write_conflict() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();

        let first = manager.begin(AccessMode::ReadWrite);
        let second = manager.begin(AccessMode::ReadWrite);
        table.insert_tuple(row(7, "a"), &first).unwrap();
        let err = table.insert_tuple(row(7, "b"), &second).unwrap_err();
        assert!(matches!(err, StorageError::WriteConflict { .. }));
    }

    #[test]
    fn test_delete_then_reinsert_same_key_in_one_transaction() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();

        let txn = manager.begin(AccessMode::ReadWrite);
        let row_id = table.insert_tuple(row(1, "a"), &txn).unwrap();
        manager.commit(&txn).unwrap();

        let txn = manager.begin(AccessMode::ReadWrite);
        assert!(table.delete_tuple(row_id, &txn).unwrap());
        table.insert_tuple(row(1, "b"), &txn).unwrap();
        manager.commit(&txn).unwrap();

        let txn = manager.begin(AccessMode::ReadOnly);
        let rows = table.scan(&txn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1[1], Value::from("b"));
    }

    #[test]
    fn test_abort_discards_insert_and_restores_delete() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();

        let txn = manager.begin(AccessMode::ReadWrite);
        let kept = table.insert_tuple(row(1, "a"), &txn).unwrap();
        manager.commit(&txn).unwrap();

        let txn = manager.begin(AccessMode::ReadWrite);
        table.delete_tuple(kept, &txn).unwrap();
        table.insert_tuple(row(2, "b"), &txn).unwrap();
        manager.abort(&txn).unwrap();

        let txn = manager.begin(AccessMode::ReadOnly);
        let rows = table.scan(&txn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, kept);
        assert_eq!(table.index_scan(0, &[Value::Integer(2)], &txn).unwrap().len(), 0);
    }

    #[test]
    fn test_index_scan_casts_lookup_key() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();

        let txn = manager.begin(AccessMode::ReadWrite);
        let row_id = table.insert_tuple(row(3, "c"), &txn).unwrap();
        assert_eq!(
            table.index_scan(0, &[Value::BigInt(3)], &txn).unwrap(),
            vec![row_id]
        );
    }

    #[test]
    fn test_sealed_table_rejects_new_index() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        table.seal_indexes();
        let err = table
            .add_index(IndexMetadata {
                name: "t_skey0".to_string(),
                key_columns: vec![1],
                constraint: IndexConstraint::Default,
                kind: IndexKind::BwTree,
            })
            .unwrap_err();
        assert!(matches!(err, StorageError::IndexesSealed(_)));
    }

    #[test]
    fn test_reopen_discards_in_flight_rows() {
        let driver = MemoryStorageDriver::default();
        let manager = TransactionManager::new();
        {
            let table = open_table(&driver);
            let committed = manager.begin(AccessMode::ReadWrite);
            table.insert_tuple(row(1, "a"), &committed).unwrap();
            manager.commit(&committed).unwrap();

            let pending = manager.begin(AccessMode::ReadWrite);
            table.insert_tuple(row(2, "b"), &pending).unwrap();
        }

        let table = open_table(&driver);
        let txn = manager.begin(AccessMode::ReadOnly);
        assert_eq!(table.scan(&txn).unwrap().len(), 1);
        assert_eq!(table.max_integer(0).unwrap(), Some(1));
    }

    #[test]
    fn test_corrupted_row_is_reported() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let tree = driver.open_tree("db.t").unwrap();
        tree.insert(&row_key(0), b"garbage!").unwrap();

        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadOnly);
        let err = table.scan(&txn).unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { row_id: 0, .. }));
    }

    fn trigger_list(names: &[&str]) -> TriggerList {
        let mut list = TriggerList::new();
        for name in names {
            list.add_trigger(crate::trigger::Trigger::new(
                *name,
                crate::trigger::TriggerType::from(1),
                "f",
                "",
                None,
                None,
            ));
        }
        list
    }

    #[test]
    fn test_staged_triggers_visible_only_to_stager() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();
        let writer = manager.begin(AccessMode::ReadWrite);
        let reader = manager.begin(AccessMode::ReadOnly);

        assert!(table.stage_triggers(writer.id(), trigger_list(&["t1"])));
        assert!(!table.stage_triggers(writer.id(), trigger_list(&["t1", "t2"])));
        assert_eq!(table.trigger_list_for(&writer).unwrap().names(), vec!["t1", "t2"]);
        assert!(table.trigger_list_for(&reader).is_none());
        assert!(table.trigger_list().is_none());

        table.discard_triggers(writer.id());
        assert!(table.trigger_list_for(&writer).is_none());
        table.publish_triggers(writer.id());
        assert!(table.trigger_list().is_none());
    }

    #[test]
    fn test_racing_publish_invalidates_cache() {
        let driver = MemoryStorageDriver::default();
        let table = open_table(&driver);
        let manager = TransactionManager::new();
        let first = manager.begin(AccessMode::ReadWrite);
        let second = manager.begin(AccessMode::ReadWrite);

        table.stage_triggers(first.id(), trigger_list(&["a"]));
        table.stage_triggers(second.id(), trigger_list(&["b"]));
        table.publish_triggers(first.id());
        assert_eq!(table.trigger_list().unwrap().names(), vec!["a"]);

        // staged before `first` published, so it missed "a"
        table.publish_triggers(second.id());
        assert!(table.trigger_list().is_none());

        table.stage_triggers(first.id(), trigger_list(&["a", "b"]));
        table.publish_triggers(first.id());
        assert_eq!(table.trigger_list().unwrap().names(), vec!["a", "b"]);
        table.invalidate_triggers();
        assert!(table.trigger_list().is_none());
    }
}
