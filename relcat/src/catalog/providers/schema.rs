// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schema catalog (`pg_namespace`)
//!
//! Name lookups and deletes scan the whole table with an equality predicate;
//! the unique name index only guards against duplicate inserts.

use super::{at_most_one, oid_at, string_at};
use crate::catalog::abstract_catalog::{ensure_active, AbstractCatalog};
use crate::catalog::constants::{SCHEMA_CATALOG_NAME, SCHEMA_CATALOG_OID};
use crate::catalog::error::CatalogResult;
use crate::catalog::registry::CatalogRegistry;
use crate::catalog::traits::CatalogProvider;
use crate::exec::{Expression, WrappedTuple};
use crate::storage::{Column, Schema};
use crate::txn::TransactionContext;
use crate::types::{Oid, TypeId};
use log::debug;
use std::sync::Arc;

pub mod column {
    pub const SCHEMA_OID: usize = 0;
    pub const SCHEMA_NAME: usize = 1;
}

pub mod index {
    pub const PRIMARY_KEY: usize = 0;
    pub const SKEY_SCHEMA_NAME: usize = 1;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCatalogObject {
    pub schema_oid: Oid,
    pub schema_name: String,
}

impl SchemaCatalogObject {
    fn from_tuple(tuple: &WrappedTuple) -> CatalogResult<Self> {
        Ok(Self {
            schema_oid: oid_at(tuple, column::SCHEMA_OID)?,
            schema_name: string_at(tuple, column::SCHEMA_NAME)?,
        })
    }
}

pub struct SchemaCatalog {
    catalog: AbstractCatalog,
}

impl SchemaCatalog {
    pub fn table_schema() -> Schema {
        Schema::new(vec![
            Column::new("schema_oid", TypeId::Integer).primary_key(),
            Column::new("schema_name", TypeId::Varchar).not_null(),
        ])
    }

    pub fn new(registry: Arc<CatalogRegistry>, txn: &TransactionContext) -> CatalogResult<Self> {
        let catalog = AbstractCatalog::from_schema(
            Arc::clone(&registry),
            SCHEMA_CATALOG_OID,
            SCHEMA_CATALOG_NAME,
            Self::table_schema(),
            txn,
        )?;
        registry.create_index(
            SCHEMA_CATALOG_OID,
            vec![column::SCHEMA_NAME],
            &format!("{}_skey0", SCHEMA_CATALOG_NAME),
            true,
            registry.default_index_kind(),
            txn,
        )?;
        Ok(Self { catalog })
    }

    /// Fresh OID for a new schema
    pub fn next_oid(&self) -> CatalogResult<Oid> {
        self.catalog.next_oid()
    }

    pub fn insert_schema(
        &self,
        schema_oid: Oid,
        schema_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<bool> {
        debug!("Inserting schema '{}' (oid {})", schema_name, schema_oid);
        self.catalog.insert_tuple_with_compiled_plan(
            vec![vec![
                Expression::constant(schema_oid),
                Expression::constant(schema_name),
            ]],
            txn,
        )
    }

    /// Returns false if no schema was named `schema_name`
    pub fn delete_schema(&self, schema_name: &str, txn: &TransactionContext) -> CatalogResult<bool> {
        self.catalog.delete_with_compiled_seq_scan(
            vec![column::SCHEMA_OID],
            name_predicate(schema_name),
            txn,
        )
    }

    pub fn get_schema_object(
        &self,
        schema_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<Option<SchemaCatalogObject>> {
        ensure_active(txn)?;
        let rows = self.catalog.get_result_with_compiled_seq_scan(
            vec![column::SCHEMA_OID, column::SCHEMA_NAME],
            Some(name_predicate(schema_name)),
            txn,
        )?;
        match at_most_one(rows, format!("schema '{}'", schema_name))? {
            Some(tuple) => Ok(Some(SchemaCatalogObject::from_tuple(&tuple)?)),
            None => Ok(None),
        }
    }

    /// Every schema visible to `txn`, in scan order
    pub fn get_schema_objects(
        &self,
        txn: &TransactionContext,
    ) -> CatalogResult<Vec<SchemaCatalogObject>> {
        let rows = self.catalog.get_result_with_compiled_seq_scan(
            vec![column::SCHEMA_OID, column::SCHEMA_NAME],
            None,
            txn,
        )?;
        rows.iter().map(SchemaCatalogObject::from_tuple).collect()
    }
}

fn name_predicate(schema_name: &str) -> Expression {
    Expression::column_eq(TypeId::Varchar, column::SCHEMA_NAME, schema_name)
}

impl CatalogProvider for SchemaCatalog {
    fn name(&self) -> &str {
        SCHEMA_CATALOG_NAME
    }

    fn catalog(&self) -> &AbstractCatalog {
        &self.catalog
    }

    fn supported_operations(&self) -> Vec<String> {
        vec![
            "insert_schema".to_string(),
            "delete_schema".to_string(),
            "get_schema_object".to_string(),
        ]
    }
}
