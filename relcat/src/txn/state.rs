// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction identity, status and the per-transaction operation log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one transaction; later transactions compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn from_u64(id: u64) -> Self {
        TransactionId(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Active,
    Committed,
    Aborted,
    /// Finalizing the write set hit a storage error
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// Catalog-level action recorded against a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Select,
    Insert,
    Delete,
    CreateTable,
    DropTable,
    CreateIndex,
    Other,
}

impl OperationType {
    /// Whether the action changes rows
    pub fn is_modification(self) -> bool {
        matches!(self, OperationType::Insert | OperationType::Delete)
    }
}

/// One entry of the operation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedOperation {
    pub kind: OperationType,
    /// Table or object the action touched, e.g. `pg_trigger row 4`
    pub target: String,
    pub at: DateTime<Utc>,
}

/// Mutable part of a transaction, guarded by its context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionState {
    pub id: TransactionId,
    pub status: TransactionStatus,
    pub access_mode: AccessMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub log: Vec<LoggedOperation>,
    /// Row inserts plus row deletes so far
    pub modifications: u64,
}

impl TransactionState {
    pub fn new(id: TransactionId, access_mode: AccessMode) -> Self {
        Self {
            id,
            status: TransactionStatus::Active,
            access_mode,
            started_at: Utc::now(),
            finished_at: None,
            log: Vec::new(),
            modifications: 0,
        }
    }

    pub fn record(&mut self, kind: OperationType, target: String) {
        if kind.is_modification() {
            self.modifications += 1;
        }
        self.log.push(LoggedOperation {
            kind,
            target,
            at: Utc::now(),
        });
    }

    pub fn commit(&mut self) {
        self.finish(TransactionStatus::Committed);
    }

    pub fn abort(&mut self) {
        self.finish(TransactionStatus::Aborted);
    }

    pub fn fail(&mut self, reason: String) {
        self.finish(TransactionStatus::Failed(reason));
    }

    fn finish(&mut self, status: TransactionStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    pub fn is_read_only(&self) -> bool {
        self.access_mode == AccessMode::ReadOnly
    }

    /// Time from begin to finish, or to now while still running
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_row_changes_count_as_modifications() {
        let mut state = TransactionState::new(TransactionId::from_u64(1), AccessMode::ReadWrite);
        state.record(OperationType::Select, "pg_namespace".to_string());
        state.record(OperationType::Insert, "pg_namespace row 0".to_string());
        state.record(OperationType::Delete, "pg_namespace row 0".to_string());
        assert_eq!(state.modifications, 2);
        assert_eq!(state.log.len(), 3);

        state.commit();
        assert!(!state.is_active());
        assert_eq!(state.status, TransactionStatus::Committed);
        assert!(state.elapsed() >= chrono::Duration::zero());
    }
}
