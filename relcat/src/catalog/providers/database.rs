// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Database catalog (`pg_database`)
//!
//! Lookups are served from the transaction's catalog cache after the first
//! read, so repeated resolution of the same database inside one transaction
//! costs a single scan.

use super::{at_most_one, oid_at, string_at};
use crate::catalog::abstract_catalog::{ensure_active, AbstractCatalog};
use crate::catalog::constants::{DATABASE_CATALOG_NAME, DATABASE_CATALOG_OID};
use crate::catalog::error::CatalogResult;
use crate::catalog::registry::CatalogRegistry;
use crate::catalog::traits::CatalogProvider;
use crate::exec::{Expression, WrappedTuple};
use crate::storage::{Column, Schema};
use crate::txn::{TransactionContext, TransactionId};
use crate::types::{Oid, TypeId, Value};
use log::debug;
use std::sync::Arc;

pub mod column {
    pub const DATABASE_OID: usize = 0;
    pub const DATABASE_NAME: usize = 1;
}

pub mod index {
    pub const PRIMARY_KEY: usize = 0;
    pub const SKEY_DATABASE_NAME: usize = 1;
}

/// One `pg_database` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCatalogObject {
    pub database_oid: Oid,
    pub database_name: String,
    /// Transaction that materialized this object
    pub txn_id: TransactionId,
}

impl DatabaseCatalogObject {
    fn from_tuple(tuple: &WrappedTuple, txn_id: TransactionId) -> CatalogResult<Self> {
        Ok(Self {
            database_oid: oid_at(tuple, column::DATABASE_OID)?,
            database_name: string_at(tuple, column::DATABASE_NAME)?,
            txn_id,
        })
    }
}

pub struct DatabaseCatalog {
    catalog: AbstractCatalog,
}

impl DatabaseCatalog {
    pub fn table_schema() -> Schema {
        Schema::new(vec![
            Column::new("database_oid", TypeId::Integer).primary_key(),
            Column::new("database_name", TypeId::Varchar).not_null(),
        ])
    }

    pub fn new(registry: Arc<CatalogRegistry>, txn: &TransactionContext) -> CatalogResult<Self> {
        let catalog = AbstractCatalog::from_schema(
            Arc::clone(&registry),
            DATABASE_CATALOG_OID,
            DATABASE_CATALOG_NAME,
            Self::table_schema(),
            txn,
        )?;
        registry.create_index(
            DATABASE_CATALOG_OID,
            vec![column::DATABASE_NAME],
            &format!("{}_skey0", DATABASE_CATALOG_NAME),
            true,
            registry.default_index_kind(),
            txn,
        )?;
        Ok(Self { catalog })
    }

    /// Fresh OID for a new database
    pub fn next_oid(&self) -> CatalogResult<Oid> {
        self.catalog.next_oid()
    }

    pub fn insert_database(
        &self,
        database_oid: Oid,
        database_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<bool> {
        debug!("Inserting database '{}' (oid {})", database_name, database_oid);
        self.catalog.insert_tuple_with_compiled_plan(
            vec![vec![
                Expression::constant(database_oid),
                Expression::constant(database_name),
            ]],
            txn,
        )
    }

    pub fn delete_database(&self, database_oid: Oid, txn: &TransactionContext) -> CatalogResult<bool> {
        txn.catalog_cache().evict_database(database_oid);
        self.catalog.delete_with_index_scan(
            index::PRIMARY_KEY,
            vec![Value::from(database_oid)],
            txn,
        )
    }

    pub fn get_database_object(
        &self,
        database_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<Option<Arc<DatabaseCatalogObject>>> {
        ensure_active(txn)?;
        if let Some(object) = txn.catalog_cache().get_database(database_oid) {
            return Ok(Some(object));
        }
        let predicate =
            Expression::column_eq(TypeId::Integer, column::DATABASE_OID, database_oid);
        self.lookup(predicate, format!("database oid {}", database_oid), txn)
    }

    pub fn get_database_object_by_name(
        &self,
        database_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<Option<Arc<DatabaseCatalogObject>>> {
        ensure_active(txn)?;
        if let Some(object) = txn.catalog_cache().get_database_by_name(database_name) {
            return Ok(Some(object));
        }
        let predicate =
            Expression::column_eq(TypeId::Varchar, column::DATABASE_NAME, database_name);
        self.lookup(predicate, format!("database '{}'", database_name), txn)
    }

    /// Every database visible to `txn`, in scan order
    pub fn get_database_objects(
        &self,
        txn: &TransactionContext,
    ) -> CatalogResult<Vec<DatabaseCatalogObject>> {
        let rows = self.catalog.get_result_with_compiled_seq_scan(
            self.catalog.table().schema().all_column_ids(),
            None,
            txn,
        )?;
        rows.iter()
            .map(|t| DatabaseCatalogObject::from_tuple(t, txn.id()))
            .collect()
    }

    fn lookup(
        &self,
        predicate: Expression,
        what: String,
        txn: &TransactionContext,
    ) -> CatalogResult<Option<Arc<DatabaseCatalogObject>>> {
        let rows = self.catalog.get_result_with_compiled_seq_scan(
            self.catalog.table().schema().all_column_ids(),
            Some(predicate),
            txn,
        )?;
        let Some(tuple) = at_most_one(rows, what)? else {
            return Ok(None);
        };
        let object = Arc::new(DatabaseCatalogObject::from_tuple(&tuple, txn.id())?);
        txn.catalog_cache().insert_database(Arc::clone(&object));
        Ok(Some(object))
    }
}

impl CatalogProvider for DatabaseCatalog {
    fn name(&self) -> &str {
        DATABASE_CATALOG_NAME
    }

    fn catalog(&self) -> &AbstractCatalog {
        &self.catalog
    }

    fn supported_operations(&self) -> Vec<String> {
        vec![
            "insert_database".to_string(),
            "delete_database".to_string(),
            "get_database_object".to_string(),
        ]
    }
}
