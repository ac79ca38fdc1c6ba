// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Table catalog (`pg_table`)
//!
//! Lookups by oid or name go through the transaction's catalog cache; only a
//! miss scans the table.

use super::{at_most_one, oid_at, string_at};
use crate::catalog::abstract_catalog::{ensure_active, AbstractCatalog};
use crate::catalog::constants::{TABLE_CATALOG_NAME, TABLE_CATALOG_OID};
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
    pub const TABLE_OID: usize = 0;
    pub const TABLE_NAME: usize = 1;
    pub const SCHEMA_NAME: usize = 2;
    pub const DATABASE_OID: usize = 3;
}

pub mod index {
    pub const PRIMARY_KEY: usize = 0;
    pub const SKEY_TABLE_NAME: usize = 1;
    pub const SKEY_DATABASE_OID: usize = 2;
}

/// One `pg_table` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCatalogObject {
    pub table_oid: Oid,
    pub table_name: String,
    pub schema_name: String,
    pub database_oid: Oid,
    pub txn_id: TransactionId,
}

impl TableCatalogObject {
    fn from_tuple(tuple: &WrappedTuple, txn_id: TransactionId) -> CatalogResult<Self> {
        Ok(Self {
            table_oid: oid_at(tuple, column::TABLE_OID)?,
            table_name: string_at(tuple, column::TABLE_NAME)?,
            schema_name: string_at(tuple, column::SCHEMA_NAME)?,
            database_oid: oid_at(tuple, column::DATABASE_OID)?,
            txn_id,
        })
    }
}

pub struct TableCatalog {
    catalog: AbstractCatalog,
}

impl TableCatalog {
    pub fn table_schema() -> Schema {
        Schema::new(vec![
            Column::new("table_oid", TypeId::Integer).primary_key(),
            Column::new("table_name", TypeId::Varchar).not_null(),
            Column::new("schema_name", TypeId::Varchar).not_null(),
            Column::new("database_oid", TypeId::Integer).not_null(),
        ])
    }

    pub fn new(registry: Arc<CatalogRegistry>, txn: &TransactionContext) -> CatalogResult<Self> {
        let catalog = AbstractCatalog::from_schema(
            Arc::clone(&registry),
            TABLE_CATALOG_OID,
            TABLE_CATALOG_NAME,
            Self::table_schema(),
            txn,
        )?;
        let kind = registry.default_index_kind();
        registry.create_index(
            TABLE_CATALOG_OID,
            vec![column::TABLE_NAME, column::DATABASE_OID],
            &format!("{}_skey0", TABLE_CATALOG_NAME),
            true,
            kind,
            txn,
        )?;
        registry.create_index(
            TABLE_CATALOG_OID,
            vec![column::DATABASE_OID],
            &format!("{}_skey1", TABLE_CATALOG_NAME),
            false,
            kind,
            txn,
        )?;
        Ok(Self { catalog })
    }

    /// Fresh OID for a new table
    pub fn next_oid(&self) -> CatalogResult<Oid> {
        self.catalog.next_oid()
    }

    pub fn insert_table(
        &self,
        table_oid: Oid,
        table_name: &str,
        schema_name: &str,
        database_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<bool> {
        debug!(
            "Inserting table '{}.{}' (oid {}) into database {}",
            schema_name, table_name, table_oid, database_oid
        );
        self.catalog.insert_tuple_with_compiled_plan(
            vec![vec![
                Expression::constant(table_oid),
                Expression::constant(table_name),
                Expression::constant(schema_name),
                Expression::constant(database_oid),
            ]],
            txn,
        )
    }

    pub fn delete_table(&self, table_oid: Oid, txn: &TransactionContext) -> CatalogResult<bool> {
        txn.catalog_cache().evict_table(table_oid);
        self.catalog.delete_with_index_scan(
            index::PRIMARY_KEY,
            vec![Value::from(table_oid)],
            txn,
        )
    }

    pub fn get_table_object(
        &self,
        table_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<Option<Arc<TableCatalogObject>>> {
        ensure_active(txn)?;
        if let Some(object) = txn.catalog_cache().get_table(table_oid) {
            return Ok(Some(object));
        }
        let predicate = Expression::column_eq(TypeId::Integer, column::TABLE_OID, table_oid);
        let rows = self.scan(Some(predicate), txn)?;
        let found = at_most_one(rows, format!("table oid {}", table_oid))?;
        Ok(found.map(|object| cache(object, txn)))
    }

    pub fn get_table_object_by_name(
        &self,
        table_name: &str,
        database_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<Option<Arc<TableCatalogObject>>> {
        ensure_active(txn)?;
        if let Some(object) = txn
            .catalog_cache()
            .get_table_by_name(database_oid, table_name)
        {
            return Ok(Some(object));
        }
        let predicate = Expression::and(
            Expression::column_eq(TypeId::Varchar, column::TABLE_NAME, table_name),
            Expression::column_eq(TypeId::Integer, column::DATABASE_OID, database_oid),
        );
        let rows = self.scan(Some(predicate), txn)?;
        let found = at_most_one(
            rows,
            format!("table '{}' in database {}", table_name, database_oid),
        )?;
        Ok(found.map(|object| cache(object, txn)))
    }

    /// Every table of one database, in scan order. The scan also fills the
    /// transaction's cache.
    pub fn get_table_objects(
        &self,
        database_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<Vec<TableCatalogObject>> {
        let predicate =
            Expression::column_eq(TypeId::Integer, column::DATABASE_OID, database_oid);
        let objects = self.scan(Some(predicate), txn)?;
        for object in &objects {
            txn.catalog_cache().insert_table(Arc::new(object.clone()));
        }
        Ok(objects)
    }

    /// Tables of one database already cached by `txn`, without scanning
    pub fn get_cached_table_objects(
        &self,
        database_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<Vec<Arc<TableCatalogObject>>> {
        ensure_active(txn)?;
        Ok(txn.catalog_cache().tables_of_database(database_oid))
    }

    fn scan(
        &self,
        predicate: Option<Expression>,
        txn: &TransactionContext,
    ) -> CatalogResult<Vec<TableCatalogObject>> {
        let rows = self.catalog.get_result_with_compiled_seq_scan(
            self.catalog.table().schema().all_column_ids(),
            predicate,
            txn,
        )?;
        rows.iter()
            .map(|t| TableCatalogObject::from_tuple(t, txn.id()))
            .collect()
    }
}

/// Keep the object already cached under the same oid, if any
fn cache(object: TableCatalogObject, txn: &TransactionContext) -> Arc<TableCatalogObject> {
    let cache = txn.catalog_cache();
    match cache.get_table(object.table_oid) {
        Some(existing) => existing,
        None => {
            let object = Arc::new(object);
            cache.insert_table(Arc::clone(&object));
            object
        }
    }
}

impl CatalogProvider for TableCatalog {
    fn name(&self) -> &str {
        TABLE_CATALOG_NAME
    }

    fn catalog(&self) -> &AbstractCatalog {
        &self.catalog
    }

    fn supported_operations(&self) -> Vec<String> {
        vec![
            "insert_table".to_string(),
            "delete_table".to_string(),
            "get_table_object".to_string(),
            "get_table_objects".to_string(),
            "get_cached_table_objects".to_string(),
        ]
    }
}
