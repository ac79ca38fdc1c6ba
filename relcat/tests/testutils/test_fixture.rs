//! Test fixture for relcat integration tests

use relcat::storage::{Column, Schema};
use relcat::txn::AccessMode;
use relcat::{CatalogConfig, Oid, SystemCatalogs, TransactionContext, TypeId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Bootstrapped catalogs plus the storage they live in
pub struct TestFixture {
    catalogs: SystemCatalogs,
    db_path: Option<PathBuf>,
    _temp_dir: Option<TempDir>,
}

impl TestFixture {
    /// Fresh in-memory catalogs
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        init_logging();
        let catalogs = SystemCatalogs::bootstrap(CatalogConfig::in_memory())?;
        Ok(Self {
            catalogs,
            db_path: None,
            _temp_dir: None,
        })
    }

    /// Fresh catalogs persisted on sled in a temporary directory
    pub fn persistent() -> Result<Self, Box<dyn std::error::Error>> {
        init_logging();
        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir.path().join("relcat_test");
        let catalogs = SystemCatalogs::bootstrap(CatalogConfig::persistent(&db_path))?;
        Ok(Self {
            catalogs,
            db_path: Some(db_path),
            _temp_dir: Some(temp_dir),
        })
    }

    /// Close and bootstrap again over the same storage
    pub fn reopen(self) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = self
            .db_path
            .clone()
            .ok_or("only persistent fixtures can be reopened")?;
        self.catalogs.shutdown()?;
        let temp_dir = self._temp_dir;
        drop(self.catalogs);
        let catalogs = SystemCatalogs::bootstrap(CatalogConfig::persistent(&db_path))?;
        Ok(Self {
            catalogs,
            db_path: Some(db_path),
            _temp_dir: temp_dir,
        })
    }

    pub fn catalogs(&self) -> &SystemCatalogs {
        &self.catalogs
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn begin(&self) -> Arc<TransactionContext> {
        self.catalogs.begin(AccessMode::ReadWrite)
    }

    pub fn commit(&self, txn: &TransactionContext) {
        self.catalogs.commit(txn).expect("commit should succeed");
    }

    /// Run `f` in its own committed transaction
    pub fn with_txn<T>(&self, f: impl FnOnce(&TransactionContext) -> T) -> T {
        let txn = self.begin();
        let result = f(&txn);
        self.commit(&txn);
        result
    }

    /// Create database `database` with one table `table (id INT PK, name VARCHAR)`
    /// and return the table's OID
    pub fn create_table(&self, database: &str, table: &str) -> Oid {
        self.with_txn(|txn| {
            if self
                .catalogs
                .databases()
                .get_database_object_by_name(database, txn)
                .expect("database lookup")
                .is_none()
            {
                self.catalogs
                    .create_database(database, txn)
                    .expect("create database");
            }
            self.catalogs
                .create_table(database, "public", table, sample_schema(), txn)
                .expect("create table")
        })
    }
}

pub fn sample_schema() -> Schema {
    Schema::new(vec![
        Column::new("id", TypeId::Integer).primary_key(),
        Column::new("name", TypeId::Varchar).with_max_length(32),
    ])
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
