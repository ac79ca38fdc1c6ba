// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Row storage for catalog and user tables
//!
//! This module provides:
//! - Column schemas and fixed-arity tuples
//! - Transactional data tables over a key-value tree
//! - Ordered secondary indexes with unique-key enforcement
//! - Backend drivers (sled, memory) behind one trait

pub mod index;
pub mod persistent;
pub mod schema;
pub mod table;
pub mod tuple;
pub mod types;

pub use index::{IndexConstraint, IndexKind, IndexMetadata};
pub use persistent::{
    create_storage_driver, BoxedStorageDriver, MemoryStorageDriver, StorageDriver,
    StorageDriverError, StorageTree, StorageType,
};
pub use schema::{Column, ConstraintType, Schema};
pub use table::DataTable;
pub use tuple::Tuple;
pub use types::{RowId, StorageError};
