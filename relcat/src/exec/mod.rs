// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution bridge
//!
//! Catalogs never touch table rows directly for predicate work: they build an
//! [`Expression`], compile it against a table into a [`CompiledSeqScan`] and
//! drain the result through a [`RowConsumer`]. Inserts of literal rows go
//! through [`CompiledInsert`].

pub mod compiler;
pub mod consumer;
pub mod error;
pub mod expression;

pub use compiler::{compile_insert, compile_seq_scan, CompiledInsert, CompiledSeqScan};
pub use consumer::{BufferingConsumer, RowConsumer, WrappedTuple};
pub use error::ExecutionError;
pub use expression::{ComparisonOp, ConjunctionOp, Expression};
