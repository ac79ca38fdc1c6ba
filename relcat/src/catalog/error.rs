// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the system catalogs

use crate::exec::ExecutionError;
use crate::storage::{StorageDriverError, StorageError};
use crate::txn::{TransactionError, TransactionId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Transaction {0} is not active")]
    InvalidTransaction(TransactionId),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Write conflict: {0}")]
    WriteConflict(String),

    #[error("Catalog invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Broad classification of a [`CatalogError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed something unusable
    CallerError,
    /// A required object does not exist
    NotFound,
    /// The write collided with existing or concurrent data
    ConstraintViolation,
    /// Stored catalog state is inconsistent
    InvariantViolation,
    /// The storage layer failed
    Storage,
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidTransaction(_)
            | CatalogError::InvalidParameters(_)
            | CatalogError::InvalidOperation(_)
            | CatalogError::Parse(_)
            | CatalogError::TypeMismatch(_) => ErrorKind::CallerError,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::ConstraintViolation(_) | CatalogError::WriteConflict(_) => {
                ErrorKind::ConstraintViolation
            }
            CatalogError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            CatalogError::Storage(_) | CatalogError::Serialization(_) => ErrorKind::Storage,
        }
    }
}

/// Outcome reported to statement-level callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Success,
    Failure,
}

impl<T> From<&CatalogResult<T>> for ResultType {
    fn from(result: &CatalogResult<T>) -> Self {
        match result {
            Ok(_) => ResultType::Success,
            Err(_) => ResultType::Failure,
        }
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation { .. } | StorageError::NotNullViolation(_) => {
                CatalogError::ConstraintViolation(err.to_string())
            }
            StorageError::WriteConflict { .. } => CatalogError::WriteConflict(err.to_string()),
            StorageError::SchemaMismatch(_) | StorageError::ValueTooLong { .. } => {
                CatalogError::TypeMismatch(err.to_string())
            }
            StorageError::IndexesSealed(_)
            | StorageError::DuplicateIndex(_)
            | StorageError::IndexNotFound(_) => CatalogError::InvalidOperation(err.to_string()),
            StorageError::Corrupted { .. } => CatalogError::InvariantViolation(err.to_string()),
            StorageError::Serialization(_) => CatalogError::Serialization(err.to_string()),
            StorageError::Driver(_) => CatalogError::Storage(err.to_string()),
        }
    }
}

impl From<StorageDriverError> for CatalogError {
    fn from(err: StorageDriverError) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<ExecutionError> for CatalogError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Storage(e) => e.into(),
            ExecutionError::InactiveTransaction(id) => CatalogError::InvalidTransaction(id),
            ExecutionError::TypeError(_) | ExecutionError::ColumnOutOfRange { .. } => {
                CatalogError::TypeMismatch(err.to_string())
            }
            ExecutionError::UnsupportedExpression(_) => {
                CatalogError::InvalidParameters(err.to_string())
            }
        }
    }
}

impl From<TransactionError> for CatalogError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotActive(id) => CatalogError::InvalidTransaction(id),
            TransactionError::Storage { source, .. } => source.into(),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for CatalogError {
    fn from(err: bincode::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_are_classified() {
        let unique: CatalogError = StorageError::UniqueViolation {
            index: "pg_namespace_skey0".to_string(),
            key: "(public)".to_string(),
        }
        .into();
        assert_eq!(unique.kind(), ErrorKind::ConstraintViolation);

        let corrupted: CatalogError = StorageError::Corrupted {
            table: "pg_trigger".to_string(),
            row_id: 3,
            reason: "checksum mismatch".to_string(),
        }
        .into();
        assert_eq!(corrupted.kind(), ErrorKind::InvariantViolation);

        let sealed: CatalogError = StorageError::IndexesSealed("pg_trigger".to_string()).into();
        assert_eq!(sealed.kind(), ErrorKind::CallerError);
    }

    #[test]
    fn test_result_type() {
        let ok: CatalogResult<()> = Ok(());
        let err: CatalogResult<()> = Err(CatalogError::NotFound("t1".to_string()));
        assert_eq!(ResultType::from(&ok), ResultType::Success);
        assert_eq!(ResultType::from(&err), ResultType::Failure);
        assert_eq!(err.unwrap_err().kind(), ErrorKind::NotFound);
    }
}
