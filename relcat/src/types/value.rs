// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Scalar value system for catalog rows
//!
//! Supports the column types used by catalog relations:
//! - Integral types: SMALLINT, INTEGER, BIGINT
//! - Variable-length types: VARCHAR, VARBINARY
//! - Temporal types: TIMESTAMP
//! - BOOLEAN and an explicit NULL

use super::oid::Oid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Declared type of a column or a constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeId {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Varchar,
    Varbinary,
    Timestamp,
}

impl TypeId {
    pub fn is_integral(self) -> bool {
        matches!(self, TypeId::SmallInt | TypeId::Integer | TypeId::BigInt)
    }

    /// Whether values of `other` can be compared against values of `self`
    pub fn is_comparable_with(self, other: TypeId) -> bool {
        self == other || (self.is_integral() && other.is_integral())
    }

    /// Whether the value is stored out of line (variable length)
    pub fn is_inlined(self) -> bool {
        !matches!(self, TypeId::Varchar | TypeId::Varbinary)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeId::Boolean => "BOOLEAN",
            TypeId::SmallInt => "SMALLINT",
            TypeId::Integer => "INTEGER",
            TypeId::BigInt => "BIGINT",
            TypeId::Varchar => "VARCHAR",
            TypeId::Varbinary => "VARBINARY",
            TypeId::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed scalar value with an explicit NULL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Varchar(String),
    Varbinary(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Build an INTEGER value holding an OID bit pattern
    pub fn from_oid(oid: Oid) -> Self {
        Value::Integer(oid.0 as i32)
    }

    pub fn varchar(s: impl Into<String>) -> Self {
        Value::Varchar(s.into())
    }

    pub fn varbinary(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Varbinary(bytes.into())
    }

    /// Type of the value, `None` for NULL
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(TypeId::Boolean),
            Value::SmallInt(_) => Some(TypeId::SmallInt),
            Value::Integer(_) => Some(TypeId::Integer),
            Value::BigInt(_) => Some(TypeId::BigInt),
            Value::Varchar(_) => Some(TypeId::Varchar),
            Value::Varbinary(_) => Some(TypeId::Varbinary),
            Value::Timestamp(_) => Some(TypeId::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Widen any integral value to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::SmallInt(v) => Some(*v as i64),
            Value::Integer(v) => Some(*v as i64),
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        self.as_i64().and_then(|v| i16::try_from(v).ok())
    }

    /// Reinterpret an INTEGER column as an OID
    pub fn as_oid(&self) -> Option<Oid> {
        match self {
            Value::Integer(v) => Some(Oid(*v as u32)),
            Value::BigInt(v) => u32::try_from(*v).ok().map(Oid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Varbinary(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert the value to the given column type.
    ///
    /// NULL converts to NULL. Integral values convert between widths when the value
    /// fits; every other conversion must be the identity.
    pub fn cast_to(&self, target: TypeId) -> Result<Value, String> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        if self.type_id() == Some(target) {
            return Ok(self.clone());
        }
        match (self.as_i64(), target) {
            (Some(v), TypeId::SmallInt) => i16::try_from(v)
                .map(Value::SmallInt)
                .map_err(|_| format!("value {} out of range for SMALLINT", v)),
            (Some(v), TypeId::Integer) => i32::try_from(v)
                .map(Value::Integer)
                .map_err(|_| format!("value {} out of range for INTEGER", v)),
            (Some(v), TypeId::BigInt) => Ok(Value::BigInt(v)),
            _ => Err(format!(
                "cannot cast {} to {}",
                self.type_id().map(|t| t.as_str()).unwrap_or("NULL"),
                target
            )),
        }
    }

    /// SQL comparison: `None` when either side is NULL or the types are unrelated
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return Some(a.cmp(&b));
        }
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Varchar(a), Value::Varchar(b)) => Some(a.cmp(b)),
            (Value::Varbinary(a), Value::Varbinary(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// SQL equality with three-valued logic
    pub fn compare_equals(&self, other: &Value) -> Option<bool> {
        self.compare(other).map(|ord| ord == Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Varchar(s) => write!(f, "{}", s),
            Value::Varbinary(bytes) => {
                write!(f, "\\x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::SmallInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Varchar(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Varchar(v)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::from_oid(oid)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
