// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage error types and row identifiers

use super::persistent::StorageDriverError;
use thiserror::Error;

/// Physical position of a row inside its table, in insertion order
pub type RowId = u64;

/// Error types for table storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage driver error: {0}")]
    Driver(#[from] StorageDriverError),

    #[error("Corrupted row {row_id} in table '{table}': {reason}")]
    Corrupted {
        table: String,
        row_id: RowId,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("NOT NULL constraint violated on column '{0}'")]
    NotNullViolation(String),

    #[error("Value too long for column '{column}' (max {max})")]
    ValueTooLong { column: String, max: usize },

    #[error("Duplicate key {key} violates unique index '{index}'")]
    UniqueViolation { index: String, key: String },

    #[error("Write conflict on row {row_id} of table '{table}'")]
    WriteConflict { table: String, row_id: RowId },

    #[error("Index '{0}' already exists")]
    DuplicateIndex(String),

    #[error("Index set of table '{0}' is sealed")]
    IndexesSealed(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
