// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sinks for rows produced by compiled scans

use super::error::ExecutionError;
use crate::storage::RowId;
use crate::types::Value;

/// A projected row together with its physical position
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedTuple {
    row_id: RowId,
    values: Vec<Value>,
}

impl WrappedTuple {
    pub fn new(row_id: RowId, values: Vec<Value>) -> Self {
        Self { row_id, values }
    }

    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    /// Value at position `index` of the projection
    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Receives rows one at a time from a running scan
pub trait RowConsumer {
    fn consume(&mut self, tuple: WrappedTuple) -> Result<(), ExecutionError>;
}

/// Collects every row in scan order
#[derive(Debug, Default)]
pub struct BufferingConsumer {
    tuples: Vec<WrappedTuple>,
}

impl BufferingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_tuples(&self) -> &[WrappedTuple] {
        &self.tuples
    }

    pub fn into_tuples(self) -> Vec<WrappedTuple> {
        self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

impl RowConsumer for BufferingConsumer {
    fn consume(&mut self, tuple: WrappedTuple) -> Result<(), ExecutionError> {
        self.tuples.push(tuple);
        Ok(())
    }
}
