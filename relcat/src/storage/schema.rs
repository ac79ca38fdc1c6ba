// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Column layout of a table
//!
//! Column order is part of the on-disk format: rows are stored positionally,
//! so a schema must never be reordered once a table holds data.

use super::types::StorageError;
use crate::types::{TypeId, Value};
use serde::{Deserialize, Serialize};

/// Column-level constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    NotNull,
    PrimaryKey,
}

/// A single column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub type_id: TypeId,
    /// Maximum length in bytes for variable-length columns
    pub max_length: Option<usize>,
    pub constraints: Vec<ConstraintType>,
}

impl Column {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            max_length: None,
            constraints: Vec::new(),
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.add_constraint(ConstraintType::NotNull);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.add_constraint(ConstraintType::PrimaryKey);
        self.add_constraint(ConstraintType::NotNull);
        self
    }

    pub fn add_constraint(&mut self, constraint: ConstraintType) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    pub fn is_not_null(&self) -> bool {
        self.constraints.iter().any(|c| {
            matches!(c, ConstraintType::NotNull | ConstraintType::PrimaryKey)
        })
    }

    pub fn is_primary(&self) -> bool {
        self.constraints.contains(&ConstraintType::PrimaryKey)
    }

    pub fn is_inlined(&self) -> bool {
        self.type_id.is_inlined()
    }
}

/// Ordered list of columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, column_id: usize) -> Option<&Column> {
        self.columns.get(column_id)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Offsets of every column, in order
    pub fn all_column_ids(&self) -> Vec<usize> {
        (0..self.columns.len()).collect()
    }

    pub fn primary_key_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary())
            .map(|(i, _)| i)
            .collect()
    }

    /// Check a row against the schema and coerce each value to its column type
    pub fn conform(&self, values: Vec<Value>) -> Result<Vec<Value>, StorageError> {
        if values.len() != self.columns.len() {
            return Err(StorageError::SchemaMismatch(format!(
                "expected {} values, got {}",
                self.columns.len(),
                values.len()
            )));
        }

        values
            .into_iter()
            .zip(&self.columns)
            .map(|(value, column)| {
                if value.is_null() {
                    if column.is_not_null() {
                        return Err(StorageError::NotNullViolation(column.name.clone()));
                    }
                    return Ok(Value::Null);
                }
                let value = value.cast_to(column.type_id).map_err(|e| {
                    StorageError::SchemaMismatch(format!("column '{}': {}", column.name, e))
                })?;
                if let Some(max) = column.max_length {
                    let len = match &value {
                        Value::Varchar(s) => s.len(),
                        Value::Varbinary(b) => b.len(),
                        _ => 0,
                    };
                    if len > max {
                        return Err(StorageError::ValueTooLong {
                            column: column.name.clone(),
                            max,
                        });
                    }
                }
                Ok(value)
            })
            .collect()
    }
}
