// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! System catalogs - the single external entry point
//!
//! [`SystemCatalogs`] owns the storage driver, the registry, the transaction
//! manager and the four catalog providers. It is built once by
//! [`SystemCatalogs::bootstrap`] and passed around explicitly; there is no
//! process-wide instance.

use super::abstract_catalog::{ensure_active, ensure_writable};
use super::constants::{
    CATALOG_DATABASE_OID, CATALOG_SCHEMA_NAME, CATALOG_SCHEMA_OID, DEFAULT_SCHEMA_NAME,
    DEFAULT_SCHEMA_OID,
};
use super::error::{CatalogError, CatalogResult};
use super::providers::{DatabaseCatalog, SchemaCatalog, TableCatalog, TriggerCatalog};
use super::registry::CatalogRegistry;
use super::traits::{CatalogProvider, CatalogSchema};
use crate::config::CatalogConfig;
use crate::storage::{create_storage_driver, DataTable, Schema};
use crate::txn::{AccessMode, DeferredAction, TransactionContext, TransactionManager};
use crate::types::Oid;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Information about a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    /// Name of the catalog
    pub name: String,
    /// Description of the backing table
    pub schema: CatalogSchema,
    /// List of supported operations
    pub supported_operations: Vec<String>,
}

/// Bootstrapped catalog system
pub struct SystemCatalogs {
    config: CatalogConfig,
    registry: Arc<CatalogRegistry>,
    txn_manager: TransactionManager,
    databases: Arc<DatabaseCatalog>,
    tables: Arc<TableCatalog>,
    schemas: Arc<SchemaCatalog>,
    triggers: Arc<TriggerCatalog>,
}

impl SystemCatalogs {
    /// Open storage and build every catalog
    ///
    /// Runs in a single transaction: catalog tables and their indexes are
    /// created, the catalog database row and the `pg_catalog` / `public`
    /// namespaces are inserted when absent, catalog index sets are sealed and
    /// user tables recorded by an earlier run are reattached.
    ///
    /// # Arguments
    /// * `config` - Storage backend, location and naming limits
    ///
    /// # Returns
    /// * `Ok(Self)` ready for use
    /// * `Err(CatalogError::InvalidParameters)` if `config` is invalid
    /// * `Err(CatalogError)` if storage cannot be opened or bootstrapping fails
    pub fn bootstrap(config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;
        info!(
            "Bootstrapping system catalogs ({} storage{})",
            config.storage_type,
            config
                .path
                .as_ref()
                .map(|p| format!(" at {}", p.display()))
                .unwrap_or_default()
        );

        let driver = create_storage_driver(
            config.storage_type,
            config.path.clone().unwrap_or_default(),
        )?;
        let registry = Arc::new(CatalogRegistry::new(
            driver,
            config.catalog_database_name.clone(),
            config.default_index_kind,
        )?);
        let txn_manager = TransactionManager::new();

        let txn = txn_manager.begin(AccessMode::ReadWrite);
        let built = Self::build_catalogs(&config, &registry, &txn);
        let (databases, tables, schemas, triggers) = match built {
            Ok(catalogs) => {
                txn_manager.commit(&txn)?;
                catalogs
            }
            Err(err) => {
                warn!("Catalog bootstrap failed: {}", err);
                txn_manager.abort(&txn)?;
                return Err(err);
            }
        };
        info!("System catalogs ready");

        Ok(Self {
            config,
            registry,
            txn_manager,
            databases,
            tables,
            schemas,
            triggers,
        })
    }

    #[allow(clippy::type_complexity)]
    fn build_catalogs(
        config: &CatalogConfig,
        registry: &Arc<CatalogRegistry>,
        txn: &TransactionContext,
    ) -> CatalogResult<(
        Arc<DatabaseCatalog>,
        Arc<TableCatalog>,
        Arc<SchemaCatalog>,
        Arc<TriggerCatalog>,
    )> {
        let databases = Arc::new(DatabaseCatalog::new(Arc::clone(registry), txn)?);
        let tables = Arc::new(TableCatalog::new(Arc::clone(registry), txn)?);
        let schemas = Arc::new(SchemaCatalog::new(Arc::clone(registry), txn)?);
        let triggers = Arc::new(TriggerCatalog::new(
            Arc::clone(registry),
            Arc::clone(&databases),
            Arc::clone(&tables),
            txn,
        )?);

        if databases.get_database_object(CATALOG_DATABASE_OID, txn)?.is_none() {
            databases.insert_database(CATALOG_DATABASE_OID, &config.catalog_database_name, txn)?;
        }
        for (oid, name) in [
            (CATALOG_SCHEMA_OID, CATALOG_SCHEMA_NAME),
            (DEFAULT_SCHEMA_OID, DEFAULT_SCHEMA_NAME),
        ] {
            if schemas.get_schema_object(name, txn)?.is_none() {
                schemas.insert_schema(oid, name, txn)?;
            }
        }

        let providers: [&dyn CatalogProvider; 4] =
            [databases.as_ref(), tables.as_ref(), schemas.as_ref(), triggers.as_ref()];
        for provider in providers {
            let oid = provider.catalog().table_oid();
            if tables.get_table_object(oid, txn)?.is_none() {
                tables.insert_table(
                    oid,
                    provider.name(),
                    CATALOG_SCHEMA_NAME,
                    CATALOG_DATABASE_OID,
                    txn,
                )?;
            }
            registry.seal(oid)?;
        }

        registry.attach_persisted_tables()?;
        Ok((databases, tables, schemas, triggers))
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    pub fn txn_manager(&self) -> &TransactionManager {
        &self.txn_manager
    }

    pub fn databases(&self) -> &DatabaseCatalog {
        &self.databases
    }

    pub fn tables(&self) -> &TableCatalog {
        &self.tables
    }

    pub fn schemas(&self) -> &SchemaCatalog {
        &self.schemas
    }

    pub fn triggers(&self) -> &TriggerCatalog {
        &self.triggers
    }

    pub fn begin(&self, access_mode: AccessMode) -> Arc<TransactionContext> {
        self.txn_manager.begin(access_mode)
    }

    pub fn commit(&self, txn: &TransactionContext) -> CatalogResult<()> {
        Ok(self.txn_manager.commit(txn)?)
    }

    pub fn abort(&self, txn: &TransactionContext) -> CatalogResult<()> {
        Ok(self.txn_manager.abort(txn)?)
    }

    /// Create a database and return its OID
    ///
    /// # Returns
    /// * `Ok(Oid)` of the new database
    /// * `Err(CatalogError::InvalidOperation)` if the name is taken
    pub fn create_database(&self, database_name: &str, txn: &TransactionContext) -> CatalogResult<Oid> {
        ensure_writable(txn)?;
        self.config.check_name("database", database_name)?;
        if self
            .databases
            .get_database_object_by_name(database_name, txn)?
            .is_some()
        {
            return Err(CatalogError::InvalidOperation(format!(
                "database '{}' already exists",
                database_name
            )));
        }
        let oid = self.databases.next_oid()?;
        self.databases.insert_database(oid, database_name, txn)?;
        info!("Created database '{}' (oid {})", database_name, oid);
        Ok(oid)
    }

    /// Drop a database together with its tables and their triggers
    pub fn drop_database(&self, database_name: &str, txn: &TransactionContext) -> CatalogResult<()> {
        ensure_writable(txn)?;
        let database = self.database_by_name(database_name, txn)?;
        if database.database_oid == CATALOG_DATABASE_OID {
            return Err(CatalogError::InvalidOperation(format!(
                "cannot drop the catalog database '{}'",
                database_name
            )));
        }
        for table in self.tables.get_table_objects(database.database_oid, txn)? {
            self.drop_table_by_oid(table.table_oid, &table.table_name, txn)?;
        }
        self.databases.delete_database(database.database_oid, txn)?;
        info!("Dropped database '{}'", database_name);
        Ok(())
    }

    /// Create a namespace and return its OID
    ///
    /// # Returns
    /// * `Ok(Oid)` of the new schema
    /// * `Err(CatalogError::InvalidOperation)` if the name is taken
    pub fn create_schema(&self, schema_name: &str, txn: &TransactionContext) -> CatalogResult<Oid> {
        ensure_writable(txn)?;
        self.config.check_name("schema", schema_name)?;
        if self.schemas.get_schema_object(schema_name, txn)?.is_some() {
            return Err(CatalogError::InvalidOperation(format!(
                "schema '{}' already exists",
                schema_name
            )));
        }
        let oid = self.schemas.next_oid()?;
        self.schemas.insert_schema(oid, schema_name, txn)?;
        info!("Created schema '{}' (oid {})", schema_name, oid);
        Ok(oid)
    }

    pub fn drop_schema(&self, schema_name: &str, txn: &TransactionContext) -> CatalogResult<()> {
        ensure_writable(txn)?;
        if schema_name == CATALOG_SCHEMA_NAME {
            return Err(CatalogError::InvalidOperation(format!(
                "cannot drop the catalog schema '{}'",
                schema_name
            )));
        }
        if !self.schemas.delete_schema(schema_name, txn)? {
            return Err(CatalogError::NotFound(format!("schema '{}'", schema_name)));
        }
        info!("Dropped schema '{}'", schema_name);
        Ok(())
    }

    /// Create a user table and record it in `pg_table`
    ///
    /// Storage is opened right away so the table is usable inside `txn`. It is
    /// released again if `txn` aborts.
    ///
    /// # Returns
    /// * `Ok(Oid)` of the new table
    /// * `Err(CatalogError::NotFound)` if the database or schema is missing
    /// * `Err(CatalogError::InvalidOperation)` if the table already exists
    pub fn create_table(
        &self,
        database_name: &str,
        schema_name: &str,
        table_name: &str,
        schema: Schema,
        txn: &TransactionContext,
    ) -> CatalogResult<Oid> {
        ensure_writable(txn)?;
        self.config.check_name("table", table_name)?;
        if schema.column_count() == 0 {
            return Err(CatalogError::InvalidParameters(format!(
                "table '{}' needs at least one column",
                table_name
            )));
        }
        let database = self.database_by_name(database_name, txn)?;
        if self.schemas.get_schema_object(schema_name, txn)?.is_none() {
            return Err(CatalogError::NotFound(format!("schema '{}'", schema_name)));
        }
        if self
            .tables
            .get_table_object_by_name(table_name, database.database_oid, txn)?
            .is_some()
        {
            return Err(CatalogError::InvalidOperation(format!(
                "table '{}.{}' already exists",
                database_name, table_name
            )));
        }

        let table_oid = self.tables.next_oid()?;
        self.registry.create_table(
            database.database_oid,
            database_name,
            table_oid,
            table_name,
            schema,
        )?;
        if let Err(err) = self.tables.insert_table(
            table_oid,
            table_name,
            schema_name,
            database.database_oid,
            txn,
        ) {
            self.registry.drop_table(table_oid)?;
            return Err(err);
        }
        txn.defer(DeferredAction::CreatedTable {
            registry: Arc::clone(&self.registry),
            table_oid,
        });
        Ok(table_oid)
    }

    /// Drop a user table together with its triggers
    ///
    /// Rows go with `txn`; the table's storage is released only when `txn`
    /// commits, so an abort leaves the table intact.
    pub fn drop_table(
        &self,
        database_name: &str,
        table_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<()> {
        ensure_writable(txn)?;
        let database = self.database_by_name(database_name, txn)?;
        if database.database_oid == CATALOG_DATABASE_OID {
            return Err(CatalogError::InvalidOperation(format!(
                "cannot drop catalog table '{}'",
                table_name
            )));
        }
        let table = self
            .tables
            .get_table_object_by_name(table_name, database.database_oid, txn)?
            .ok_or_else(|| {
                CatalogError::NotFound(format!("table '{}.{}'", database_name, table_name))
            })?;
        self.drop_table_by_oid(table.table_oid, table_name, txn)
    }

    fn drop_table_by_oid(
        &self,
        table_oid: Oid,
        table_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<()> {
        self.triggers.delete_triggers_of_table(table_oid, txn)?;
        self.tables.delete_table(table_oid, txn)?;
        if self.registry.get_table(table_oid).is_some() {
            txn.defer(DeferredAction::DroppedTable {
                registry: Arc::clone(&self.registry),
                table_oid,
            });
        } else {
            warn!("Table '{}' (oid {}) had no storage", table_name, table_oid);
        }
        debug!("Dropped table '{}' (oid {}), storage released on commit", table_name, table_oid);
        Ok(())
    }

    /// Open handle of `database_name.table_name`, or `None` if it does not exist
    pub fn get_table_handle(
        &self,
        database_name: &str,
        table_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<Option<Arc<DataTable>>> {
        ensure_active(txn)?;
        let Some(database) = self
            .databases
            .get_database_object_by_name(database_name, txn)?
        else {
            return Ok(None);
        };
        let table = self
            .tables
            .get_table_object_by_name(table_name, database.database_oid, txn)?;
        Ok(table.and_then(|t| self.registry.get_table(t.table_oid)))
    }

    fn database_by_name(
        &self,
        database_name: &str,
        txn: &TransactionContext,
    ) -> CatalogResult<Arc<super::providers::DatabaseCatalogObject>> {
        self.databases
            .get_database_object_by_name(database_name, txn)?
            .ok_or_else(|| CatalogError::NotFound(format!("database '{}'", database_name)))
    }

    fn providers(&self) -> [&dyn CatalogProvider; 4] {
        [
            self.databases.as_ref(),
            self.tables.as_ref(),
            self.schemas.as_ref(),
            self.triggers.as_ref(),
        ]
    }

    /// Describe one catalog by table name
    ///
    /// # Returns
    /// * `Some(CatalogInfo)` if catalog exists
    /// * `None` if catalog not found
    pub fn get_catalog_info(&self, catalog_name: &str) -> Option<CatalogInfo> {
        self.providers()
            .into_iter()
            .find(|p| p.name() == catalog_name)
            .map(|p| CatalogInfo {
                name: p.name().to_string(),
                schema: p.schema(),
                supported_operations: p.supported_operations(),
            })
    }

    /// List all catalog table names
    pub fn list_catalogs(&self) -> Vec<String> {
        self.providers()
            .into_iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Information about all catalogs
    pub fn list_catalog_info(&self) -> Vec<CatalogInfo> {
        self.list_catalogs()
            .into_iter()
            .filter_map(|name| self.get_catalog_info(&name))
            .collect()
    }

    pub fn flush(&self) -> CatalogResult<()> {
        self.registry.flush()
    }

    /// Abort pending transactions and flush storage
    pub fn shutdown(&self) -> CatalogResult<()> {
        let pending = self.txn_manager.active_count();
        if pending > 0 {
            warn!("Aborting {} pending transaction(s) at shutdown", pending);
        }
        self.txn_manager.shutdown();
        self.flush()?;
        info!("System catalogs shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Column;
    use crate::types::TypeId;

    fn catalogs() -> SystemCatalogs {
        SystemCatalogs::bootstrap(CatalogConfig::in_memory()).unwrap()
    }

    #[test]
    fn test_bootstrap_rows() {
        let catalogs = catalogs();
        let txn = catalogs.begin(AccessMode::ReadOnly);

        let names: Vec<_> = catalogs
            .schemas()
            .get_schema_objects(&txn)
            .unwrap()
            .into_iter()
            .map(|s| s.schema_name)
            .collect();
        assert_eq!(names, vec!["pg_catalog", "public"]);

        let catalog_tables: Vec<_> = catalogs
            .tables()
            .get_table_objects(CATALOG_DATABASE_OID, &txn)
            .unwrap()
            .into_iter()
            .map(|t| t.table_name)
            .collect();
        assert_eq!(
            catalog_tables,
            vec!["pg_database", "pg_table", "pg_namespace", "pg_trigger"]
        );
        assert_eq!(catalogs.list_catalog_info().len(), 4);
    }

    #[test]
    fn test_catalog_indexes_sealed() {
        let catalogs = catalogs();
        for table in catalogs.registry().tables() {
            assert!(table.is_sealed(), "{} is not sealed", table.name());
        }
        let info = catalogs.get_catalog_info("pg_trigger").unwrap();
        assert_eq!(
            info.schema.indexes,
            vec!["pg_trigger_pkey", "pg_trigger_skey0", "pg_trigger_skey1", "pg_trigger_skey2"]
        );
    }

    #[test]
    fn test_create_and_drop_table() {
        let catalogs = catalogs();
        let txn = catalogs.begin(AccessMode::ReadWrite);
        catalogs.create_database("app", &txn).unwrap();
        let schema = Schema::new(vec![Column::new("id", TypeId::Integer).primary_key()]);
        let oid = catalogs
            .create_table("app", "public", "users", schema.clone(), &txn)
            .unwrap();
        assert!(oid.as_u32() >= crate::catalog::constants::FIRST_USER_OID);
        assert!(catalogs.get_table_handle("app", "users", &txn).unwrap().is_some());
        assert!(matches!(
            catalogs.create_table("app", "public", "users", schema, &txn),
            Err(CatalogError::InvalidOperation(_))
        ));

        catalogs.drop_table("app", "users", &txn).unwrap();
        assert!(catalogs.get_table_handle("app", "users", &txn).unwrap().is_none());
        assert!(catalogs.registry().get_table(oid).is_some());
        catalogs.commit(&txn).unwrap();
        assert!(catalogs.registry().get_table(oid).is_none());
    }

    #[test]
    fn test_name_limits_and_protected_objects() {
        let catalogs = catalogs();
        let txn = catalogs.begin(AccessMode::ReadWrite);
        let long = "x".repeat(65);
        assert!(matches!(
            catalogs.create_schema(&long, &txn),
            Err(CatalogError::InvalidParameters(_))
        ));
        assert!(matches!(
            catalogs.drop_schema("pg_catalog", &txn),
            Err(CatalogError::InvalidOperation(_))
        ));
        assert!(matches!(
            catalogs.drop_database("pg_catalog", &txn),
            Err(CatalogError::InvalidOperation(_))
        ));
        assert!(matches!(
            catalogs.drop_schema("missing", &txn),
            Err(CatalogError::NotFound(_))
        ));
    }
}
