// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Concrete system catalogs
//!
//! Each provider owns one catalog table and translates typed requests into
//! predicates over it. The helpers below turn projected rows back into typed
//! fields; a value of the wrong type means the stored catalog is inconsistent.

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::exec::WrappedTuple;
use crate::types::Oid;
use chrono::{DateTime, Utc};
use std::fmt::Display;

pub mod database;
pub mod schema;
pub mod table;
pub mod trigger;

pub use database::{DatabaseCatalog, DatabaseCatalogObject};
pub use schema::{SchemaCatalog, SchemaCatalogObject};
pub use table::{TableCatalog, TableCatalogObject};
pub use trigger::TriggerCatalog;

fn column_error(tuple: &WrappedTuple, index: usize, expected: &str) -> CatalogError {
    CatalogError::InvariantViolation(format!(
        "row {}: expected {} at position {}, found {:?}",
        tuple.row_id(),
        expected,
        index,
        tuple.get_value(index)
    ))
}

pub(crate) fn oid_at(tuple: &WrappedTuple, index: usize) -> CatalogResult<Oid> {
    tuple
        .get_value(index)
        .and_then(|v| v.as_oid())
        .ok_or_else(|| column_error(tuple, index, "an oid"))
}

pub(crate) fn string_at(tuple: &WrappedTuple, index: usize) -> CatalogResult<String> {
    tuple
        .get_value(index)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| column_error(tuple, index, "a string"))
}

/// Nullable VARCHAR
pub(crate) fn optional_string_at(tuple: &WrappedTuple, index: usize) -> CatalogResult<Option<String>> {
    match tuple.get_value(index) {
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| column_error(tuple, index, "a string or NULL")),
        None => Err(column_error(tuple, index, "a string or NULL")),
    }
}

/// Nullable VARBINARY, returned byte-for-byte
pub(crate) fn optional_bytes_at(tuple: &WrappedTuple, index: usize) -> CatalogResult<Option<Vec<u8>>> {
    match tuple.get_value(index) {
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_bytes()
            .map(|b| Some(b.to_vec()))
            .ok_or_else(|| column_error(tuple, index, "bytes or NULL")),
        None => Err(column_error(tuple, index, "bytes or NULL")),
    }
}

pub(crate) fn i16_at(tuple: &WrappedTuple, index: usize) -> CatalogResult<i16> {
    tuple
        .get_value(index)
        .and_then(|v| v.as_i16())
        .ok_or_else(|| column_error(tuple, index, "a small integer"))
}

pub(crate) fn timestamp_at(tuple: &WrappedTuple, index: usize) -> CatalogResult<DateTime<Utc>> {
    tuple
        .get_value(index)
        .and_then(|v| v.as_timestamp())
        .ok_or_else(|| column_error(tuple, index, "a timestamp"))
}

/// At most one row may match a lookup on a logically unique key
pub(crate) fn at_most_one<T>(mut rows: Vec<T>, what: impl Display) -> CatalogResult<Option<T>> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        n => Err(CatalogError::InvariantViolation(format!(
            "{} matched {} rows",
            what, n
        ))),
    }
}
