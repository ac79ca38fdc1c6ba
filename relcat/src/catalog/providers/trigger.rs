// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Trigger catalog (`pg_trigger`)
//!
//! Stores one row per trigger and materializes them into [`TriggerList`]s.
//! Every successful mutation stages the table's fresh trigger list in the
//! table's cache through [`TriggerCacheInvalidation`]. The list becomes the
//! table's shared list only when the transaction commits.
//!
//! Per `(tgrelid, tgname)` a trigger is either absent or active: inserting
//! makes it active, dropping makes it absent again. Nothing enforces unique
//! names, so inserting the same name twice leaves two rows and the next
//! lookup by name reports an invariant violation.

use super::database::DatabaseCatalog;
use super::table::TableCatalog;
use super::{
    at_most_one, i16_at, oid_at, optional_bytes_at, optional_string_at, string_at, timestamp_at,
};
use crate::catalog::abstract_catalog::{ensure_active, AbstractCatalog};
use crate::catalog::constants::{TRIGGER_CATALOG_NAME, TRIGGER_CATALOG_OID};
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::registry::CatalogRegistry;
use crate::catalog::traits::{CatalogProvider, TriggerCacheInvalidation};
use crate::exec::{Expression, WrappedTuple};
use crate::storage::Tuple;
use crate::trigger::{Trigger, TriggerList, TriggerType};
use crate::txn::{DeferredAction, TransactionContext};
use crate::types::{Oid, TypeId, Value};
use chrono::{DateTime, Utc};
use log::{debug, info, trace};
use std::sync::Arc;

pub mod column {
    pub const TRIGGER_OID: usize = 0;
    pub const TABLE_OID: usize = 1;
    pub const TRIGGER_NAME: usize = 2;
    pub const FUNCTION_NAME: usize = 3;
    pub const TRIGGER_TYPE: usize = 4;
    pub const FUNCTION_ARGS: usize = 5;
    pub const FIRE_CONDITION: usize = 6;
    pub const TIMESTAMP: usize = 7;
}

pub mod index {
    pub const PRIMARY_KEY: usize = 0;
    /// (tgrelid, tgtype)
    pub const SKEY_TABLE_TYPE: usize = 1;
    /// (tgrelid)
    pub const SKEY_TABLE: usize = 2;
    /// (tgname, tgrelid)
    pub const SKEY_NAME_TABLE: usize = 3;
}

/// Bootstrap DDL; column order is the on-disk layout
fn bootstrap_ddl(database_name: &str) -> String {
    format!(
        "CREATE TABLE {}.{} (\
         oid INT NOT NULL PRIMARY KEY, \
         tgrelid INT NOT NULL, \
         tgname VARCHAR NOT NULL, \
         tgfoid VARCHAR, \
         tgtype INT NOT NULL, \
         tgargs VARCHAR, \
         tgqual VARBINARY, \
         timestamp TIMESTAMP NOT NULL);",
        database_name, TRIGGER_CATALOG_NAME
    )
}

pub struct TriggerCatalog {
    catalog: AbstractCatalog,
    databases: Arc<DatabaseCatalog>,
    tables: Arc<TableCatalog>,
}

impl TriggerCatalog {
    pub fn new(
        registry: Arc<CatalogRegistry>,
        databases: Arc<DatabaseCatalog>,
        tables: Arc<TableCatalog>,
        txn: &TransactionContext,
    ) -> CatalogResult<Self> {
        let ddl = bootstrap_ddl(registry.catalog_database_name());
        let catalog =
            AbstractCatalog::from_ddl(Arc::clone(&registry), TRIGGER_CATALOG_OID, &ddl, txn)?;

        let kind = registry.default_index_kind();
        let secondary: [(Vec<usize>, &str); 3] = [
            (vec![column::TABLE_OID, column::TRIGGER_TYPE], "skey0"),
            (vec![column::TABLE_OID], "skey1"),
            (vec![column::TRIGGER_NAME, column::TABLE_OID], "skey2"),
        ];
        for (columns, suffix) in secondary {
            registry.create_index(
                TRIGGER_CATALOG_OID,
                columns,
                &format!("{}_{}", TRIGGER_CATALOG_NAME, suffix),
                false,
                kind,
                txn,
            )?;
        }
        Ok(Self {
            catalog,
            databases,
            tables,
        })
    }

    /// Record a trigger on `table_oid` and return its new OID
    ///
    /// # Arguments
    /// * `function_args` - Comma-joined argument list, see [`Trigger::serialize_function_args`]
    /// * `fire_condition` - Serialized WHEN condition, stored byte-for-byte
    #[allow(clippy::too_many_arguments)]
    pub fn insert_trigger(
        &self,
        table_oid: Oid,
        trigger_name: &str,
        trigger_type: TriggerType,
        function_name: &str,
        function_args: &str,
        fire_condition: Option<Vec<u8>>,
        timestamp: DateTime<Utc>,
        txn: &TransactionContext,
    ) -> CatalogResult<Oid> {
        ensure_active(txn)?;
        let trigger_oid = self.catalog.next_oid()?;
        info!(
            "Inserting trigger '{}' (oid {}) of type {} on table {}",
            trigger_name, trigger_oid, trigger_type, table_oid
        );

        let mut tuple = Tuple::new(self.catalog.table().schema());
        tuple.set_value(column::TRIGGER_OID, trigger_oid)?;
        tuple.set_value(column::TABLE_OID, table_oid)?;
        tuple.set_value(column::TRIGGER_NAME, trigger_name)?;
        tuple.set_value(column::FUNCTION_NAME, function_name)?;
        tuple.set_value(column::TRIGGER_TYPE, Value::Integer(trigger_type.bits() as i32))?;
        tuple.set_value(column::FUNCTION_ARGS, function_args)?;
        tuple.set_value(column::FIRE_CONDITION, fire_condition.map(Value::Varbinary))?;
        tuple.set_value(column::TIMESTAMP, timestamp)?;
        self.catalog.insert_tuple(tuple, txn)?;

        self.refresh_table_cache(table_oid, txn)?;
        Ok(trigger_oid)
    }

    /// Drop the trigger `trigger_name` of `database_name.table_name`
    ///
    /// # Returns
    /// * `Ok(())` once the row is deleted and the table's new list staged
    /// * `Err(CatalogError::InvalidTransaction)` if `txn` is not active
    /// * `Err(CatalogError::NotFound)` if the database, table or trigger is missing
    pub fn drop_trigger(
        &self,
        database_name: &str,
        table_name: &str,
        trigger_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<()> {
        if let Err(err) = ensure_active(txn) {
            trace!("No active transaction to drop trigger on '{}'", table_name);
            return Err(err);
        }

        let database = self
            .databases
            .get_database_object_by_name(database_name, txn)?
            .ok_or_else(|| CatalogError::NotFound(format!("database '{}'", database_name)))?;
        let table = self
            .tables
            .get_table_object_by_name(table_name, database.database_oid, txn)?
            .ok_or_else(|| {
                CatalogError::NotFound(format!("table '{}.{}'", database_name, table_name))
            })?;

        let trigger_oid = self.get_trigger_oid(trigger_name, table.table_oid, txn)?;
        if !trigger_oid.is_valid() {
            trace!("Cannot find trigger '{}' to drop", trigger_name);
            return Err(CatalogError::NotFound(format!(
                "trigger '{}' on table '{}'",
                trigger_name, table_name
            )));
        }
        info!("Dropping trigger '{}' (oid {})", trigger_name, trigger_oid);

        let deleted = self.catalog.delete_with_index_scan(
            index::SKEY_NAME_TABLE,
            vec![Value::from(trigger_name), Value::from(table.table_oid)],
            txn,
        )?;
        if !deleted {
            return Err(CatalogError::NotFound(format!(
                "trigger '{}' on table '{}'",
                trigger_name, table_name
            )));
        }
        debug!("Deleted trigger '{}'", trigger_name);
        self.refresh_table_cache(table.table_oid, txn)
    }

    /// Delete every trigger of `table_oid`; returns false if it had none
    pub fn delete_triggers_of_table(
        &self,
        table_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<bool> {
        let deleted = self.catalog.delete_with_index_scan(
            index::SKEY_TABLE,
            vec![Value::from(table_oid)],
            txn,
        )?;
        if deleted {
            self.refresh_table_cache(table_oid, txn)?;
        }
        Ok(deleted)
    }

    /// OID of the trigger named `trigger_name` on `table_oid`, or
    /// [`Oid::INVALID`] if there is none
    pub fn get_trigger_oid(
        &self,
        trigger_name: &str,
        table_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<Oid> {
        let predicate = Expression::and(
            Expression::column_eq(TypeId::Varchar, column::TRIGGER_NAME, trigger_name),
            Expression::column_eq(TypeId::Integer, column::TABLE_OID, table_oid),
        );
        let rows = self.catalog.get_result_with_compiled_seq_scan(
            vec![column::TRIGGER_OID],
            Some(predicate),
            txn,
        )?;
        match at_most_one(
            rows,
            format!("trigger '{}' on table {}", trigger_name, table_oid),
        )? {
            Some(tuple) => oid_at(&tuple, 0),
            None => {
                debug!("Trigger '{}' doesn't exist", trigger_name);
                Ok(Oid::INVALID)
            }
        }
    }

    /// Triggers of `table_oid` whose type equals `trigger_type` exactly
    pub fn get_triggers_by_type(
        &self,
        table_oid: Oid,
        trigger_type: TriggerType,
        txn: &TransactionContext,
    ) -> CatalogResult<TriggerList> {
        debug!("Get triggers of type {} for table {}", trigger_type, table_oid);
        let predicate = Expression::and(
            Expression::column_eq(TypeId::Integer, column::TRIGGER_TYPE, trigger_type.bits()),
            Expression::column_eq(TypeId::Integer, column::TABLE_OID, table_oid),
        );
        self.materialize(predicate, txn)
    }

    /// Every trigger of `table_oid`, in scan order
    pub fn get_triggers(
        &self,
        table_oid: Oid,
        txn: &TransactionContext,
    ) -> CatalogResult<TriggerList> {
        debug!("Get triggers for table {}", table_oid);
        let predicate = Expression::column_eq(TypeId::Integer, column::TABLE_OID, table_oid);
        self.materialize(predicate, txn)
    }

    fn materialize(
        &self,
        predicate: Expression,
        txn: &TransactionContext,
    ) -> CatalogResult<TriggerList> {
        let rows = self.catalog.get_result_with_compiled_seq_scan(
            vec![
                column::TRIGGER_NAME,
                column::TRIGGER_TYPE,
                column::FUNCTION_NAME,
                column::FUNCTION_ARGS,
                column::FIRE_CONDITION,
                column::TIMESTAMP,
            ],
            Some(predicate),
            txn,
        )?;
        trace!("Trigger scan matched {} row(s)", rows.len());
        rows.iter().map(trigger_from_tuple).collect()
    }

    /// Stage the trigger list of `table_oid` as `txn` sees it in the table's
    /// cache; it is published when `txn` commits
    fn refresh_table_cache(&self, table_oid: Oid, txn: &TransactionContext) -> CatalogResult<()> {
        let Some(table) = self.catalog.registry().get_table(table_oid) else {
            trace!("Table {} is not open, skipping trigger refresh", table_oid);
            return Ok(());
        };
        let triggers = self.get_triggers(table_oid, txn)?;
        let receiver: Arc<dyn TriggerCacheInvalidation> = table;
        if receiver.stage_triggers(txn.id(), triggers) {
            txn.defer(DeferredAction::TriggerCache(receiver));
        }
        Ok(())
    }
}

/// Row projected as (tgname, tgtype, tgfoid, tgargs, tgqual, timestamp)
fn trigger_from_tuple(tuple: &WrappedTuple) -> CatalogResult<Trigger> {
    Ok(Trigger::new(
        string_at(tuple, 0)?,
        TriggerType::from(i16_at(tuple, 1)?),
        optional_string_at(tuple, 2)?.unwrap_or_default(),
        optional_string_at(tuple, 3)?.unwrap_or_default(),
        optional_bytes_at(tuple, 4)?,
        Some(timestamp_at(tuple, 5)?),
    ))
}

impl CatalogProvider for TriggerCatalog {
    fn name(&self) -> &str {
        TRIGGER_CATALOG_NAME
    }

    fn catalog(&self) -> &AbstractCatalog {
        &self.catalog
    }

    fn supported_operations(&self) -> Vec<String> {
        vec![
            "insert_trigger".to_string(),
            "drop_trigger".to_string(),
            "get_trigger_oid".to_string(),
            "get_triggers_by_type".to_string(),
            "get_triggers".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::constants::CATALOG_DATABASE_NAME;

    #[test]
    fn test_bootstrap_ddl_parses_to_expected_layout() {
        let statement =
            crate::catalog::ddl::parse_create_table(&bootstrap_ddl(CATALOG_DATABASE_NAME)).unwrap();
        assert_eq!(statement.database.as_deref(), Some(CATALOG_DATABASE_NAME));
        assert_eq!(
            statement.schema.column_names(),
            vec!["oid", "tgrelid", "tgname", "tgfoid", "tgtype", "tgargs", "tgqual", "timestamp"]
        );
        assert_eq!(statement.schema.primary_key_columns(), vec![column::TRIGGER_OID]);
        assert!(!statement.schema.column(column::FUNCTION_NAME).unwrap().is_not_null());
        assert!(statement.schema.column(column::TIMESTAMP).unwrap().is_not_null());
    }
}
