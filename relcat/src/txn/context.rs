// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-transaction handle passed to every catalog call

use super::state::{AccessMode, OperationType, TransactionId, TransactionState, TransactionStatus};
use crate::catalog::cache::CatalogCache;
use crate::catalog::registry::CatalogRegistry;
use crate::catalog::traits::TriggerCacheInvalidation;
use crate::storage::{DataTable, RowId};
use crate::types::Oid;
use parking_lot::Mutex;
use std::sync::Arc;

/// Kind of change a transaction made to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Delete,
}

/// One entry of a transaction's write set
#[derive(Debug, Clone)]
pub struct WriteRecord {
    pub table: Arc<DataTable>,
    pub row_id: RowId,
    pub kind: WriteKind,
}

impl WriteRecord {
    pub fn insert(table: Arc<DataTable>, row_id: RowId) -> Self {
        Self {
            table,
            row_id,
            kind: WriteKind::Insert,
        }
    }

    pub fn delete(table: Arc<DataTable>, row_id: RowId) -> Self {
        Self {
            table,
            row_id,
            kind: WriteKind::Delete,
        }
    }
}

/// Catalog side effect applied once the transaction's outcome is known
pub enum DeferredAction {
    /// A trigger list staged on this receiver; published on commit,
    /// discarded on abort
    TriggerCache(Arc<dyn TriggerCacheInvalidation>),
    /// Storage opened for a table this transaction created; released on abort
    CreatedTable {
        registry: Arc<CatalogRegistry>,
        table_oid: Oid,
    },
    /// Storage of a table this transaction dropped; released on commit
    DroppedTable {
        registry: Arc<CatalogRegistry>,
        table_oid: Oid,
    },
}

impl std::fmt::Debug for DeferredAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeferredAction::TriggerCache(_) => f.write_str("TriggerCache"),
            DeferredAction::CreatedTable { table_oid, .. } => {
                write!(f, "CreatedTable({})", table_oid)
            }
            DeferredAction::DroppedTable { table_oid, .. } => {
                write!(f, "DroppedTable({})", table_oid)
            }
        }
    }
}

/// A running (or finished) transaction
///
/// A finished transaction stays usable as a handle but every catalog
/// operation rejects it.
pub struct TransactionContext {
    id: TransactionId,
    state: Mutex<TransactionState>,
    write_set: Mutex<Vec<WriteRecord>>,
    deferred: Mutex<Vec<DeferredAction>>,
    catalog_cache: CatalogCache,
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("writes", &self.write_count())
            .finish()
    }
}

impl TransactionContext {
    pub(crate) fn new(id: TransactionId, access_mode: AccessMode) -> Self {
        Self {
            id,
            state: Mutex::new(TransactionState::new(id, access_mode)),
            write_set: Mutex::new(Vec::new()),
            deferred: Mutex::new(Vec::new()),
            catalog_cache: CatalogCache::default(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn status(&self) -> TransactionStatus {
        self.state.lock().status.clone()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().is_active()
    }

    pub fn is_read_only(&self) -> bool {
        self.state.lock().is_read_only()
    }

    pub fn access_mode(&self) -> AccessMode {
        self.state.lock().access_mode
    }

    /// Snapshot of the state, including the operation log
    pub fn state(&self) -> TransactionState {
        self.state.lock().clone()
    }

    pub fn record_operation(&self, operation_type: OperationType, description: impl Into<String>) {
        self.state
            .lock()
            .record(operation_type, description.into());
    }

    pub fn write_count(&self) -> usize {
        self.write_set.lock().len()
    }

    /// Objects materialized by catalog lookups in this transaction
    pub fn catalog_cache(&self) -> &CatalogCache {
        &self.catalog_cache
    }

    pub(crate) fn record_write(&self, record: WriteRecord) {
        self.write_set.lock().push(record);
    }

    pub(crate) fn take_write_set(&self) -> Vec<WriteRecord> {
        std::mem::take(&mut *self.write_set.lock())
    }

    pub(crate) fn defer(&self, action: DeferredAction) {
        self.deferred.lock().push(action);
    }

    pub(crate) fn take_deferred(&self) -> Vec<DeferredAction> {
        std::mem::take(&mut *self.deferred.lock())
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut TransactionState) -> R) -> R {
        f(&mut self.state.lock())
    }
}
