// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fixed-arity row under construction

use super::schema::Schema;
use super::types::StorageError;
use crate::types::Value;

/// A row laid out according to a table schema, filled with NULL until set
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(schema: &Schema) -> Self {
        Self {
            values: vec![Value::Null; schema.column_count()],
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn set_value(&mut self, column_id: usize, value: impl Into<Value>) -> Result<(), StorageError> {
        let arity = self.values.len();
        let slot = self.values.get_mut(column_id).ok_or_else(|| {
            StorageError::SchemaMismatch(format!(
                "column {} out of range for tuple of arity {}",
                column_id, arity
            ))
        })?;
        *slot = value.into();
        Ok(())
    }

    pub fn get_value(&self, column_id: usize) -> Option<&Value> {
        self.values.get(column_id)
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
