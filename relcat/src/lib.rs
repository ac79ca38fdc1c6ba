// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! relcat - system catalogs for a relational engine
//!
//! Database, table, namespace and trigger metadata are stored in ordinary
//! transactional tables and read back through compiled scans, so catalog
//! reads see exactly what the surrounding transaction sees.
//!
//! # Usage
//!
//! ```no_run
//! use relcat::{CatalogConfig, SystemCatalogs};
//! use relcat::txn::AccessMode;
//!
//! let catalogs = SystemCatalogs::bootstrap(CatalogConfig::persistent("./mydb"))?;
//! let txn = catalogs.begin(AccessMode::ReadWrite);
//! catalogs.create_schema("sales", &txn)?;
//! catalogs.commit(&txn)?;
//! # Ok::<(), relcat::CatalogError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod exec;
pub mod storage;
pub mod trigger;
pub mod txn;
pub mod types;

pub use catalog::{CatalogError, CatalogResult, ResultType, SystemCatalogs};
pub use config::CatalogConfig;
pub use trigger::{Trigger, TriggerList, TriggerType};
pub use txn::{TransactionContext, TransactionManager};
pub use types::{Oid, TypeId, Value};

/// relcat version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// relcat crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
