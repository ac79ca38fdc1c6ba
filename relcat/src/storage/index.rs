// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Secondary index metadata and in-memory index structure

use super::types::RowId;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Requested physical index structure
///
/// All kinds are served by the same ordered map today; the kind is kept as
/// metadata so the catalog records what was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    #[default]
    BwTree,
    BTree,
    Hash,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexKind::BwTree => "bwtree",
            IndexKind::BTree => "btree",
            IndexKind::Hash => "hash",
        };
        write!(f, "{}", s)
    }
}

/// Constraint enforced by an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexConstraint {
    PrimaryKey,
    Unique,
    Default,
}

/// Definition of one index on a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub name: String,
    /// Table column offsets that form the key, in key order
    pub key_columns: Vec<usize>,
    pub constraint: IndexConstraint,
    pub kind: IndexKind,
}

impl IndexMetadata {
    pub fn is_unique(&self) -> bool {
        matches!(
            self.constraint,
            IndexConstraint::PrimaryKey | IndexConstraint::Unique
        )
    }
}

/// Ordered key → row ids map. Holds every stored version, visible or not.
#[derive(Debug)]
pub(crate) struct SecondaryIndex {
    pub(crate) metadata: IndexMetadata,
    entries: BTreeMap<Vec<Value>, BTreeSet<RowId>>,
}

impl SecondaryIndex {
    pub(crate) fn new(metadata: IndexMetadata) -> Self {
        Self {
            metadata,
            entries: BTreeMap::new(),
        }
    }

    /// Project the key columns out of a full row
    pub(crate) fn key_of(&self, row: &[Value]) -> Vec<Value> {
        self.metadata
            .key_columns
            .iter()
            .map(|&c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect()
    }

    pub(crate) fn insert(&mut self, row: &[Value], row_id: RowId) {
        let key = self.key_of(row);
        self.entries.entry(key).or_default().insert(row_id);
    }

    pub(crate) fn remove(&mut self, row: &[Value], row_id: RowId) {
        let key = self.key_of(row);
        if let Some(ids) = self.entries.get_mut(&key) {
            ids.remove(&row_id);
            if ids.is_empty() {
                self.entries.remove(&key);
            }
        }
    }

    pub(crate) fn lookup(&self, key: &[Value]) -> Vec<RowId> {
        self.entries
            .get(key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }
}
