// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compile expression trees into executable scans and inserts

use super::consumer::{RowConsumer, WrappedTuple};
use super::error::ExecutionError;
use super::expression::Expression;
use crate::storage::{DataTable, RowId, Tuple};
use crate::txn::TransactionContext;
use crate::types::TypeId;
use log::trace;
use std::sync::Arc;

/// Sequential scan with projection and an optional filter
#[derive(Debug)]
pub struct CompiledSeqScan {
    table: Arc<DataTable>,
    column_ids: Vec<usize>,
    predicate: Option<Expression>,
}

/// Compile a scan of `table` that projects `column_ids` from rows matching
/// `predicate`. Without a predicate every visible row qualifies.
pub fn compile_seq_scan(
    table: &Arc<DataTable>,
    column_ids: Vec<usize>,
    predicate: Option<Expression>,
) -> Result<CompiledSeqScan, ExecutionError> {
    let arity = table.schema().column_count();
    if let Some(&column) = column_ids.iter().find(|&&c| c >= arity) {
        return Err(ExecutionError::ColumnOutOfRange {
            table: table.name().to_string(),
            column,
            arity,
        });
    }

    let predicate = predicate
        .map(|p| p.bind(table.name(), table.schema()))
        .transpose()?;
    if let Some(p) = &predicate {
        if !matches!(p.result_type(), None | Some(TypeId::Boolean)) {
            return Err(ExecutionError::TypeError(format!(
                "predicate {} is not boolean",
                p
            )));
        }
    }

    Ok(CompiledSeqScan {
        table: Arc::clone(table),
        column_ids,
        predicate,
    })
}

impl CompiledSeqScan {
    pub fn table(&self) -> &Arc<DataTable> {
        &self.table
    }

    /// Feed every qualifying row visible to `txn` into `consumer`, in row-id
    /// order. Returns the number of rows produced.
    pub fn execute(
        &self,
        txn: &TransactionContext,
        consumer: &mut dyn RowConsumer,
    ) -> Result<usize, ExecutionError> {
        if !txn.is_active() {
            return Err(ExecutionError::InactiveTransaction(txn.id()));
        }

        let mut produced = 0;
        for (row_id, values) in self.table.scan(txn)? {
            if let Some(predicate) = &self.predicate {
                if !predicate.qualifies(&values)? {
                    continue;
                }
            }
            let projected = self
                .column_ids
                .iter()
                .map(|&c| values[c].clone())
                .collect();
            consumer.consume(WrappedTuple::new(row_id, projected))?;
            produced += 1;
        }
        trace!(
            "Seq scan of '{}' produced {} row(s)",
            self.table.name(),
            produced
        );
        Ok(produced)
    }
}

/// Insert of constant rows
#[derive(Debug)]
pub struct CompiledInsert {
    table: Arc<DataTable>,
    rows: Vec<Tuple>,
}

/// Compile an insert of `rows` into `table`. Every expression must fold to a
/// constant; values are coerced to column types at execution.
pub fn compile_insert(
    table: &Arc<DataTable>,
    rows: Vec<Vec<Expression>>,
) -> Result<CompiledInsert, ExecutionError> {
    let arity = table.schema().column_count();
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() != arity {
            return Err(ExecutionError::TypeError(format!(
                "insert into '{}' expects {} values, got {}",
                table.name(),
                arity,
                row.len()
            )));
        }
        let values = row
            .into_iter()
            .map(|expr| match expr {
                Expression::Constant(value) => Ok(value),
                other => Err(ExecutionError::UnsupportedExpression(format!(
                    "insert value must be a constant: {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        tuples.push(Tuple::from_values(values));
    }
    Ok(CompiledInsert {
        table: Arc::clone(table),
        rows: tuples,
    })
}

impl CompiledInsert {
    /// Insert every row under `txn`; stops at the first failure
    pub fn execute(&self, txn: &TransactionContext) -> Result<Vec<RowId>, ExecutionError> {
        if !txn.is_active() {
            return Err(ExecutionError::InactiveTransaction(txn.id()));
        }
        let mut row_ids = Vec::with_capacity(self.rows.len());
        for tuple in &self.rows {
            row_ids.push(self.table.insert_tuple(tuple.clone(), txn)?);
        }
        Ok(row_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::consumer::BufferingConsumer;
    use crate::exec::expression::ComparisonOp;
    use crate::storage::{Column, MemoryStorageDriver, Schema, StorageDriver};
    use crate::txn::{AccessMode, TransactionManager};
    use crate::types::{Oid, Value};

    fn table() -> Arc<DataTable> {
        let driver = MemoryStorageDriver::default();
        let schema = Schema::new(vec![
            Column::new("oid", TypeId::Integer).not_null(),
            Column::new("name", TypeId::Varchar),
        ]);
        Arc::new(
            DataTable::open(
                Oid::new(9),
                Oid::new(1),
                "t",
                schema,
                driver.open_tree("db.t").unwrap(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_insert_then_filtered_scan() {
        let table = table();
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadWrite);

        let rows = (1..=3)
            .map(|i| {
                vec![
                    Expression::constant(i),
                    Expression::constant(format!("n{}", i)),
                ]
            })
            .collect();
        let inserted = compile_insert(&table, rows).unwrap().execute(&txn).unwrap();
        assert_eq!(inserted, vec![0, 1, 2]);

        let scan = compile_seq_scan(
            &table,
            vec![1],
            Some(Expression::compare(
                ComparisonOp::GreaterThan,
                Expression::column(TypeId::Integer, 0),
                Expression::constant(1),
            )),
        )
        .unwrap();
        let mut consumer = BufferingConsumer::new();
        assert_eq!(scan.execute(&txn, &mut consumer).unwrap(), 2);
        let names: Vec<_> = consumer
            .output_tuples()
            .iter()
            .map(|t| t.get_value(0).cloned().unwrap())
            .collect();
        assert_eq!(names, vec![Value::from("n2"), Value::from("n3")]);
    }

    #[test]
    fn test_insert_rejects_non_constant() {
        let table = table();
        let err = compile_insert(
            &table,
            vec![vec![
                Expression::column(TypeId::Integer, 0),
                Expression::constant("x"),
            ]],
        )
        .unwrap_err();
        assert!(matches!(err, ExecutionError::UnsupportedExpression(_)));
    }

    #[test]
    fn test_projection_out_of_range() {
        let err = compile_seq_scan(&table(), vec![0, 5], None).unwrap_err();
        assert!(matches!(err, ExecutionError::ColumnOutOfRange { column: 5, .. }));
    }

    #[test]
    fn test_execute_requires_active_transaction() {
        let table = table();
        let manager = TransactionManager::new();
        let txn = manager.begin(AccessMode::ReadOnly);
        manager.commit(&txn).unwrap();

        let scan = compile_seq_scan(&table, vec![0], None).unwrap();
        let mut consumer = BufferingConsumer::new();
        assert!(matches!(
            scan.execute(&txn, &mut consumer),
            Err(ExecutionError::InactiveTransaction(_))
        ));
    }
}
