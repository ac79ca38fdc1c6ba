// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//

use super::state::TransactionId;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised while finishing a transaction
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction {0} is not active")]
    NotActive(TransactionId),

    #[error("Failed to finalize transaction {id}: {source}")]
    Storage {
        id: TransactionId,
        #[source]
        source: StorageError,
    },
}
