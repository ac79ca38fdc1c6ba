// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error types

use crate::storage::StorageError;
use crate::txn::TransactionId;
use thiserror::Error;

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Column {column} out of range for table '{table}' with {arity} columns")]
    ColumnOutOfRange {
        table: String,
        column: usize,
        arity: usize,
    },

    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Transaction {0} is not active")]
    InactiveTransaction(TransactionId),
}
