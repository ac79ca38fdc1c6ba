// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction management
//!
//! Catalog operations always run inside a caller-supplied transaction. A
//! transaction sees committed rows plus its own uncommitted writes; commit
//! makes those writes visible to everyone and abort discards them.
//!
//! # Features
//! - Transaction lifecycle management (begin, commit, abort)
//! - Access modes (READ ONLY, READ WRITE)
//! - Write-set tracking for row finalization
//! - Catalog side effects deferred to commit or abort
//! - Per-transaction catalog object cache

pub mod context;
pub mod error;
pub mod manager;
pub mod state;

pub use context::{DeferredAction, TransactionContext, WriteKind, WriteRecord};
pub use error::TransactionError;
pub use manager::TransactionManager;
pub use state::{AccessMode, LoggedOperation, OperationType, TransactionId, TransactionStatus};
