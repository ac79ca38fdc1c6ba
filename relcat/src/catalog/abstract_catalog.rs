// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Row-level primitives shared by every concrete catalog
//!
//! Each catalog owns exactly one backing table. Lookups and deletes go through
//! the execution bridge: the catalog builds an [`Expression`], this module
//! compiles it against the backing table and runs it under the caller's
//! transaction. Row order in results is physical scan order.

use super::constants::CATALOG_DATABASE_OID;
use super::ddl::parse_create_table;
use super::error::{CatalogError, CatalogResult};
use super::registry::CatalogRegistry;
use crate::exec::{
    compile_insert, compile_seq_scan, BufferingConsumer, Expression, WrappedTuple,
};
use crate::storage::{DataTable, Schema, Tuple};
use crate::txn::{OperationType, TransactionContext};
use crate::types::{Oid, Value};
use log::{debug, trace};
use std::sync::Arc;

pub struct AbstractCatalog {
    registry: Arc<CatalogRegistry>,
    table: Arc<DataTable>,
}

impl AbstractCatalog {
    /// Build the backing table from a bootstrap `CREATE TABLE` statement
    pub fn from_ddl(
        registry: Arc<CatalogRegistry>,
        table_oid: Oid,
        ddl: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<Self> {
        ensure_active(txn)?;
        let statement = parse_create_table(ddl)?;
        if let Some(database) = &statement.database {
            if database != registry.catalog_database_name() {
                return Err(CatalogError::InvalidParameters(format!(
                    "catalog table '{}' must live in database '{}', not '{}'",
                    statement.table,
                    registry.catalog_database_name(),
                    database
                )));
            }
        }
        Self::from_schema(registry, table_oid, &statement.table, statement.schema, txn)
    }

    /// Build the backing table from an explicit schema
    pub fn from_schema(
        registry: Arc<CatalogRegistry>,
        table_oid: Oid,
        table_name: &str,
        schema: Schema,
        txn: &TransactionContext,
    ) -> CatalogResult<Self> {
        ensure_active(txn)?;
        let table =
            registry.create_catalog_table(CATALOG_DATABASE_OID, table_oid, table_name, schema)?;
        txn.record_operation(OperationType::CreateTable, table_name);
        debug!("Catalog table '{}' ready (oid {})", table_name, table_oid);
        Ok(Self { registry, table })
    }

    pub fn table(&self) -> &Arc<DataTable> {
        &self.table
    }

    pub fn table_oid(&self) -> Oid {
        self.table.oid()
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    /// Fresh OID for a new row of this catalog
    pub fn next_oid(&self) -> CatalogResult<Oid> {
        self.registry.next_oid(self.table.oid())
    }

    /// Insert one fully built row
    pub fn insert_tuple(&self, tuple: Tuple, txn: &TransactionContext) -> CatalogResult<bool> {
        ensure_writable(txn)?;
        let row_id = self.table.insert_tuple(tuple, txn)?;
        txn.record_operation(
            OperationType::Insert,
            format!("{} row {}", self.table.name(), row_id),
        );
        Ok(true)
    }

    /// Delete every visible row whose key under index `index_offset` equals
    /// `values`. Returns false when nothing matched.
    pub fn delete_with_index_scan(
        &self,
        index_offset: usize,
        values: Vec<Value>,
        txn: &TransactionContext,
    ) -> CatalogResult<bool> {
        ensure_writable(txn)?;
        let row_ids = self.table.index_scan(index_offset, &values, txn)?;
        trace!(
            "Index scan {} on '{}' matched {} row(s)",
            index_offset,
            self.table.name(),
            row_ids.len()
        );
        let mut deleted = false;
        for row_id in row_ids {
            if self.table.delete_tuple(row_id, txn)? {
                txn.record_operation(
                    OperationType::Delete,
                    format!("{} row {}", self.table.name(), row_id),
                );
                deleted = true;
            }
        }
        Ok(deleted)
    }

    /// Delete every visible row matching `predicate`. Returns false when
    /// nothing matched.
    pub fn delete_with_compiled_seq_scan(
        &self,
        column_ids: Vec<usize>,
        predicate: Expression,
        txn: &TransactionContext,
    ) -> CatalogResult<bool> {
        ensure_writable(txn)?;
        let matches = self.get_result_with_compiled_seq_scan(column_ids, Some(predicate), txn)?;
        let mut deleted = false;
        for tuple in matches {
            if self.table.delete_tuple(tuple.row_id(), txn)? {
                txn.record_operation(
                    OperationType::Delete,
                    format!("{} row {}", self.table.name(), tuple.row_id()),
                );
                deleted = true;
            }
        }
        Ok(deleted)
    }

    /// Project `column_ids` from every visible row matching `predicate`
    pub fn get_result_with_compiled_seq_scan(
        &self,
        column_ids: Vec<usize>,
        predicate: Option<Expression>,
        txn: &TransactionContext,
    ) -> CatalogResult<Vec<WrappedTuple>> {
        ensure_active(txn)?;
        let scan = compile_seq_scan(&self.table, column_ids, predicate)?;
        let mut consumer = BufferingConsumer::new();
        scan.execute(txn, &mut consumer)?;
        txn.record_operation(OperationType::Select, self.table.name());
        Ok(consumer.into_tuples())
    }

    /// Insert rows given as constant expressions through a compiled plan
    pub fn insert_tuple_with_compiled_plan(
        &self,
        rows: Vec<Vec<Expression>>,
        txn: &TransactionContext,
    ) -> CatalogResult<bool> {
        ensure_writable(txn)?;
        let plan = compile_insert(&self.table, rows)?;
        let row_ids = plan.execute(txn)?;
        for row_id in &row_ids {
            txn.record_operation(
                OperationType::Insert,
                format!("{} row {}", self.table.name(), row_id),
            );
        }
        Ok(!row_ids.is_empty())
    }
}

/// Reject finished transactions
pub(crate) fn ensure_active(txn: &TransactionContext) -> CatalogResult<()> {
    if txn.is_active() {
        Ok(())
    } else {
        Err(CatalogError::InvalidTransaction(txn.id()))
    }
}

/// Reject finished and read-only transactions
pub(crate) fn ensure_writable(txn: &TransactionContext) -> CatalogResult<()> {
    ensure_active(txn)?;
    if txn.is_read_only() {
        return Err(CatalogError::InvalidOperation(format!(
            "transaction {} is read-only",
            txn.id()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ComparisonOp;
    use crate::storage::{IndexKind, MemoryStorageDriver};
    use crate::txn::{AccessMode, TransactionManager};
    use crate::types::TypeId;

    const DDL: &str = "CREATE TABLE pg_catalog.pg_sample (\
        oid INT NOT NULL PRIMARY KEY, name VARCHAR NOT NULL, size INT);";

    fn setup() -> (AbstractCatalog, TransactionManager) {
        let registry = Arc::new(
            CatalogRegistry::new(
                Box::new(MemoryStorageDriver::default()),
                "pg_catalog",
                IndexKind::BwTree,
            )
            .unwrap(),
        );
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadWrite);
        let catalog = AbstractCatalog::from_ddl(registry, Oid::new(30), DDL, &txn).unwrap();
        manager.commit(&txn).unwrap();
        (catalog, manager)
    }

    fn row(oid: i32, name: &str, size: i32) -> Vec<Expression> {
        vec![
            Expression::constant(oid),
            Expression::constant(name),
            Expression::constant(size),
        ]
    }

    #[test]
    fn test_insert_scan_delete_cycle() {
        let (catalog, manager) = setup();
        let txn = manager.begin(AccessMode::ReadWrite);
        assert!(catalog
            .insert_tuple_with_compiled_plan(
                vec![row(1000, "a", 1), row(1001, "b", 2), row(1002, "c", 2)],
                &txn
            )
            .unwrap());

        let size_two = Expression::column_eq(TypeId::Integer, 2, 2);
        let rows = catalog
            .get_result_with_compiled_seq_scan(vec![1], Some(size_two.clone()), &txn)
            .unwrap();
        let names: Vec<_> = rows.iter().map(|t| t.get_value(0).cloned()).collect();
        assert_eq!(names, vec![Some(Value::from("b")), Some(Value::from("c"))]);

        assert!(catalog
            .delete_with_compiled_seq_scan(vec![0], size_two.clone(), &txn)
            .unwrap());
        assert!(!catalog
            .delete_with_compiled_seq_scan(vec![0], size_two, &txn)
            .unwrap());

        assert!(catalog
            .delete_with_index_scan(0, vec![Value::Integer(1000)], &txn)
            .unwrap());
        assert!(!catalog
            .delete_with_index_scan(0, vec![Value::Integer(1000)], &txn)
            .unwrap());
        manager.commit(&txn).unwrap();
    }

    #[test]
    fn test_operations_require_active_transaction() {
        let (catalog, manager) = setup();
        let txn = manager.begin(AccessMode::ReadWrite);
        manager.abort(&txn).unwrap();

        let err = catalog
            .get_result_with_compiled_seq_scan(vec![0], None, &txn)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTransaction(_)));
        let err = catalog
            .insert_tuple_with_compiled_plan(vec![row(1, "x", 0)], &txn)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTransaction(_)));
    }

    #[test]
    fn test_read_only_transaction_cannot_write() {
        let (catalog, manager) = setup();
        let txn = manager.begin(AccessMode::ReadOnly);
        let err = catalog
            .insert_tuple_with_compiled_plan(vec![row(1, "x", 0)], &txn)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOperation(_)));
    }

    #[test]
    fn test_duplicate_primary_key_is_constraint_violation() {
        let (catalog, manager) = setup();
        let txn = manager.begin(AccessMode::ReadWrite);
        catalog
            .insert_tuple_with_compiled_plan(vec![row(5, "x", 0)], &txn)
            .unwrap();
        let err = catalog
            .insert_tuple_with_compiled_plan(vec![row(5, "y", 0)], &txn)
            .unwrap_err();
        assert_eq!(err.kind(), crate::catalog::error::ErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_range_predicate() {
        let (catalog, manager) = setup();
        let txn = manager.begin(AccessMode::ReadWrite);
        catalog
            .insert_tuple_with_compiled_plan(vec![row(1, "a", 10), row(2, "b", 20)], &txn)
            .unwrap();
        let rows = catalog
            .get_result_with_compiled_seq_scan(
                vec![0],
                Some(Expression::compare(
                    ComparisonOp::GreaterThanOrEqual,
                    Expression::column(TypeId::Integer, 2),
                    Expression::constant(15),
                )),
                &txn,
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_value(0), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_ddl_in_wrong_database_rejected() {
        let registry = Arc::new(
            CatalogRegistry::new(
                Box::new(MemoryStorageDriver::default()),
                "pg_catalog",
                IndexKind::BwTree,
            )
            .unwrap(),
        );
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadWrite);
        let err = AbstractCatalog::from_ddl(
            registry,
            Oid::new(31),
            "CREATE TABLE other.t (oid INT PRIMARY KEY)",
            &txn,
        )
        .err()
        .unwrap();
        assert!(matches!(err, CatalogError::InvalidParameters(_)));
    }
}
