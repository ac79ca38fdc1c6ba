// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction manager implementation
//!
//! Hands out transaction contexts and finalizes their write sets on commit
//! or abort.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use super::context::{DeferredAction, TransactionContext, WriteKind};
use crate::catalog::registry::CatalogRegistry;
use crate::types::Oid;
use super::error::TransactionError;
use super::state::{AccessMode, TransactionId};

/// How a transaction ended, as seen by its deferred actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Committed,
    Aborted,
    /// Commit stopped part way through its write set
    Failed,
}

/// Transaction manager handles the lifecycle of all transactions
pub struct TransactionManager {
    /// Map of active transactions by ID
    active_transactions: RwLock<HashMap<TransactionId, Arc<TransactionContext>>>,
    /// Last id handed out; ids are strictly increasing
    last_id: Mutex<u64>,
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionManager {
    pub fn new() -> Self {
        Self {
            active_transactions: RwLock::new(HashMap::new()),
            last_id: Mutex::new(0),
        }
    }

    fn next_id(&self) -> TransactionId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let mut last = self.last_id.lock();
        *last = now.max(*last + 1);
        TransactionId::from_u64(*last)
    }

    /// Start a new transaction
    pub fn begin(&self, access_mode: AccessMode) -> Arc<TransactionContext> {
        let id = self.next_id();
        let txn = Arc::new(TransactionContext::new(id, access_mode));
        self.active_transactions
            .write()
            .insert(id, Arc::clone(&txn));
        debug!("BEGIN {} ({:?})", id, access_mode);
        txn
    }

    /// Make every write of `txn` permanent
    pub fn commit(&self, txn: &TransactionContext) -> Result<(), TransactionError> {
        self.ensure_active(txn)?;
        let writes = txn.take_write_set();
        let count = writes.len();

        for record in writes {
            let result = match record.kind {
                WriteKind::Insert => record.table.commit_insert(record.row_id, txn.id()),
                WriteKind::Delete => record.table.commit_delete(record.row_id, txn.id()),
            };
            if let Err(source) = result {
                warn!("COMMIT {} failed: {}", txn.id(), source);
                self.apply_deferred(txn, Outcome::Failed);
                txn.with_state(|s| s.fail(source.to_string()));
                self.active_transactions.write().remove(&txn.id());
                return Err(TransactionError::Storage {
                    id: txn.id(),
                    source,
                });
            }
        }

        self.apply_deferred(txn, Outcome::Committed);
        txn.with_state(|s| s.commit());
        self.active_transactions.write().remove(&txn.id());
        debug!("COMMIT {} ({} write(s))", txn.id(), count);
        Ok(())
    }

    /// Undo every write of `txn`, newest first
    pub fn abort(&self, txn: &TransactionContext) -> Result<(), TransactionError> {
        self.ensure_active(txn)?;
        let writes = txn.take_write_set();
        let count = writes.len();

        let mut first_error = None;
        for record in writes.into_iter().rev() {
            let result = match record.kind {
                WriteKind::Insert => record.table.abort_insert(record.row_id, txn.id()),
                WriteKind::Delete => record.table.abort_delete(record.row_id, txn.id()),
            };
            if let Err(e) = result {
                warn!("ABORT {}: failed to undo row {}: {}", txn.id(), record.row_id, e);
                first_error.get_or_insert(e);
            }
        }
        self.apply_deferred(txn, Outcome::Aborted);

        self.active_transactions.write().remove(&txn.id());
        match first_error {
            Some(source) => {
                txn.with_state(|s| s.fail(source.to_string()));
                Err(TransactionError::Storage {
                    id: txn.id(),
                    source,
                })
            }
            None => {
                txn.with_state(|s| s.abort());
                debug!("ABORT {} ({} write(s) undone)", txn.id(), count);
                Ok(())
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_transactions.read().len()
    }

    /// Abort whatever is still running
    pub fn shutdown(&self) {
        let pending: Vec<_> = self.active_transactions.read().values().cloned().collect();
        if !pending.is_empty() {
            info!("Aborting {} unfinished transaction(s)", pending.len());
        }
        for txn in pending {
            if let Err(e) = self.abort(&txn) {
                warn!("{}", e);
            }
        }
    }

    /// Run the catalog side effects `txn` deferred, newest first
    fn apply_deferred(&self, txn: &TransactionContext, outcome: Outcome) {
        for action in txn.take_deferred().into_iter().rev() {
            match (action, outcome) {
                (DeferredAction::TriggerCache(receiver), Outcome::Committed) => {
                    receiver.publish_triggers(txn.id())
                }
                (DeferredAction::TriggerCache(receiver), Outcome::Aborted) => {
                    receiver.discard_triggers(txn.id())
                }
                (DeferredAction::TriggerCache(receiver), Outcome::Failed) => {
                    receiver.discard_triggers(txn.id());
                    receiver.invalidate_triggers();
                }
                (DeferredAction::CreatedTable { registry, table_oid }, Outcome::Aborted)
                | (DeferredAction::DroppedTable { registry, table_oid }, Outcome::Committed) => {
                    release_table(txn, &registry, table_oid)
                }
                // storage stays put when the outcome keeps the table
                _ => {}
            }
        }
    }

    fn ensure_active(&self, txn: &TransactionContext) -> Result<(), TransactionError> {
        if txn.is_active() {
            Ok(())
        } else {
            Err(TransactionError::NotActive(txn.id()))
        }
    }
}

fn release_table(txn: &TransactionContext, registry: &CatalogRegistry, table_oid: Oid) {
    match registry.drop_table(table_oid) {
        Ok(table) => debug!("{} released storage of '{}'", txn.id(), table.name()),
        Err(e) => warn!(
            "{} could not release storage of table {}: {}",
            txn.id(),
            table_oid,
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let manager = TransactionManager::new();
        let a = manager.begin(AccessMode::ReadWrite);
        let b = manager.begin(AccessMode::ReadWrite);
        assert!(b.id() > a.id());
        assert_eq!(manager.active_count(), 2);
    }

    #[test]
    fn test_finished_transaction_cannot_commit_again() {
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadWrite);
        manager.commit(&txn).unwrap();
        assert!(!txn.is_active());
        assert!(matches!(
            manager.commit(&txn),
            Err(TransactionError::NotActive(_))
        ));
        assert!(matches!(
            manager.abort(&txn),
            Err(TransactionError::NotActive(_))
        ));
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_shutdown_aborts_pending() {
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadWrite);
        manager.shutdown();
        assert!(!txn.is_active());
        assert_eq!(manager.active_count(), 0);
    }
}
