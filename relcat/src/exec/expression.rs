// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Owned predicate and value expression trees
//!
//! Catalogs build one tree per call and move it into the compiled scan.
//! Evaluation follows SQL three-valued logic: comparisons involving NULL
//! yield NULL, and a row qualifies only when its predicate is TRUE.

use super::error::ExecutionError;
use crate::storage::Schema;
use crate::types::{TypeId, Value};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOp {
    fn matches(self, ord: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ord == Ordering::Equal,
            ComparisonOp::NotEqual => ord != Ordering::Equal,
            ComparisonOp::LessThan => ord == Ordering::Less,
            ComparisonOp::LessThanOrEqual => ord != Ordering::Greater,
            ComparisonOp::GreaterThan => ord == Ordering::Greater,
            ComparisonOp::GreaterThanOrEqual => ord != Ordering::Less,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConjunctionOp {
    And,
    Or,
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Comparison {
        op: ComparisonOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Conjunction {
        op: ConjunctionOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Column of the row being scanned
    ColumnRef { type_id: TypeId, column_id: usize },
    Constant(Value),
}

impl Expression {
    pub fn column(type_id: TypeId, column_id: usize) -> Self {
        Expression::ColumnRef { type_id, column_id }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn compare(op: ComparisonOp, left: Expression, right: Expression) -> Self {
        Expression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::compare(ComparisonOp::Equal, left, right)
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::Conjunction {
            op: ConjunctionOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Conjunction {
            op: ConjunctionOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `column = value`
    pub fn column_eq(type_id: TypeId, column_id: usize, value: impl Into<Value>) -> Self {
        Self::eq(Self::column(type_id, column_id), Self::constant(value))
    }

    /// Static result type; `None` for a NULL constant
    pub fn result_type(&self) -> Option<TypeId> {
        match self {
            Expression::Comparison { .. } | Expression::Conjunction { .. } => {
                Some(TypeId::Boolean)
            }
            Expression::ColumnRef { type_id, .. } => Some(*type_id),
            Expression::Constant(value) => value.type_id(),
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expression::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Resolve column references against `schema` and coerce constants
    /// compared with a column to that column's type.
    pub fn bind(self, table: &str, schema: &Schema) -> Result<Expression, ExecutionError> {
        match self {
            Expression::ColumnRef { type_id, column_id } => {
                let column = schema
                    .column(column_id)
                    .ok_or_else(|| ExecutionError::ColumnOutOfRange {
                        table: table.to_string(),
                        column: column_id,
                        arity: schema.column_count(),
                    })?;
                if !type_id.is_comparable_with(column.type_id) {
                    return Err(ExecutionError::TypeError(format!(
                        "column '{}' is {} but was referenced as {}",
                        column.name, column.type_id, type_id
                    )));
                }
                Ok(Expression::ColumnRef {
                    type_id: column.type_id,
                    column_id,
                })
            }
            Expression::Constant(value) => Ok(Expression::Constant(value)),
            Expression::Conjunction { op, left, right } => {
                let left = left.bind(table, schema)?;
                let right = right.bind(table, schema)?;
                for side in [&left, &right] {
                    if !matches!(side.result_type(), None | Some(TypeId::Boolean)) {
                        return Err(ExecutionError::TypeError(format!(
                            "operand of {:?} is not boolean: {}",
                            op, side
                        )));
                    }
                }
                Ok(Expression::Conjunction {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            Expression::Comparison { op, left, right } => {
                let left = left.bind(table, schema)?;
                let right = right.bind(table, schema)?;
                let (left, right) = coerce_pair(left, right)?;
                if let (Some(l), Some(r)) = (left.result_type(), right.result_type()) {
                    if !l.is_comparable_with(r) {
                        return Err(ExecutionError::TypeError(format!(
                            "cannot compare {} with {}",
                            l, r
                        )));
                    }
                }
                Ok(Expression::Comparison {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
        }
    }

    pub fn evaluate(&self, row: &[Value]) -> Result<Value, ExecutionError> {
        match self {
            Expression::Constant(value) => Ok(value.clone()),
            Expression::ColumnRef { column_id, .. } => {
                row.get(*column_id)
                    .cloned()
                    .ok_or_else(|| ExecutionError::ColumnOutOfRange {
                        table: String::new(),
                        column: *column_id,
                        arity: row.len(),
                    })
            }
            Expression::Comparison { op, left, right } => {
                let l = left.evaluate(row)?;
                let r = right.evaluate(row)?;
                Ok(match l.compare(&r) {
                    Some(ord) => Value::Boolean(op.matches(ord)),
                    None => Value::Null,
                })
            }
            Expression::Conjunction { op, left, right } => {
                let l = truth(&left.evaluate(row)?)?;
                let r = truth(&right.evaluate(row)?)?;
                let result = match op {
                    ConjunctionOp::And => match (l, r) {
                        (Some(false), _) | (_, Some(false)) => Some(false),
                        (Some(true), Some(true)) => Some(true),
                        _ => None,
                    },
                    ConjunctionOp::Or => match (l, r) {
                        (Some(true), _) | (_, Some(true)) => Some(true),
                        (Some(false), Some(false)) => Some(false),
                        _ => None,
                    },
                };
                Ok(result.map(Value::Boolean).unwrap_or(Value::Null))
            }
        }
    }

    /// True only when the predicate evaluates to TRUE
    pub fn qualifies(&self, row: &[Value]) -> Result<bool, ExecutionError> {
        Ok(truth(&self.evaluate(row)?)? == Some(true))
    }
}

fn truth(value: &Value) -> Result<Option<bool>, ExecutionError> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        other => Err(ExecutionError::TypeError(format!(
            "expected boolean, got {}",
            other
        ))),
    }
}

fn coerce_pair(
    left: Expression,
    right: Expression,
) -> Result<(Expression, Expression), ExecutionError> {
    match (left, right) {
        (column @ Expression::ColumnRef { type_id, .. }, Expression::Constant(value)) => {
            let value = value.cast_to(type_id).map_err(ExecutionError::TypeError)?;
            Ok((column, Expression::Constant(value)))
        }
        (Expression::Constant(value), column @ Expression::ColumnRef { type_id, .. }) => {
            let value = value.cast_to(type_id).map_err(ExecutionError::TypeError)?;
            Ok((Expression::Constant(value), column))
        }
        pair => Ok(pair),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Comparison { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Expression::Conjunction { op, left, right } => {
                let op = match op {
                    ConjunctionOp::And => "AND",
                    ConjunctionOp::Or => "OR",
                };
                write!(f, "({} {} {})", left, op, right)
            }
            Expression::ColumnRef { column_id, .. } => write!(f, "#{}", column_id),
            Expression::Constant(Value::Varchar(s)) => write!(f, "'{}'", s),
            Expression::Constant(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Column;

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("oid", TypeId::Integer),
            Column::new("name", TypeId::Varchar),
        ])
    }

    #[test]
    fn test_bind_casts_constant_to_column_type() {
        let expr = Expression::column_eq(TypeId::Integer, 0, 5i16)
            .bind("t", &schema())
            .unwrap();
        match expr {
            Expression::Comparison { right, .. } => {
                assert_eq!(*right, Expression::Constant(Value::Integer(5)))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bind_rejects_bad_column() {
        let err = Expression::column_eq(TypeId::Integer, 9, 1)
            .bind("t", &schema())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::ColumnOutOfRange { column: 9, .. }));

        let err = Expression::column_eq(TypeId::Varchar, 0, "x")
            .bind("t", &schema())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::TypeError(_)));
    }

    #[test]
    fn test_three_valued_logic() {
        let row = vec![Value::Integer(1), Value::Null];
        let name_is_x = Expression::column_eq(TypeId::Varchar, 1, "x");
        let oid_is_one = Expression::column_eq(TypeId::Integer, 0, 1);

        assert_eq!(name_is_x.evaluate(&row).unwrap(), Value::Null);
        assert!(!name_is_x.qualifies(&row).unwrap());

        let and = Expression::and(oid_is_one.clone(), name_is_x.clone());
        assert_eq!(and.evaluate(&row).unwrap(), Value::Null);

        let or = Expression::or(oid_is_one, name_is_x);
        assert!(or.qualifies(&row).unwrap());
    }

    #[test]
    fn test_display() {
        let expr = Expression::and(
            Expression::column_eq(TypeId::Integer, 0, 1),
            Expression::column_eq(TypeId::Varchar, 1, "a"),
        );
        assert_eq!(expr.to_string(), "((#0 = 1) AND (#1 = 'a'))");
    }
}
