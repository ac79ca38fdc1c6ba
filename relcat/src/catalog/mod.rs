// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! System catalogs
//!
//! Engine metadata lives in ordinary transactional tables. Every catalog
//! wraps one such table through [`AbstractCatalog`] and shares a single
//! [`CatalogRegistry`]; [`SystemCatalogs`] builds and owns them all.

pub mod abstract_catalog;
pub mod cache;
pub mod constants;
pub mod ddl;
pub mod error;
pub mod manager;
pub mod providers;
pub mod registry;
pub mod traits;

pub use abstract_catalog::AbstractCatalog;
pub use cache::{CacheStats, CatalogCache};
pub use error::{CatalogError, CatalogResult, ErrorKind, ResultType};
pub use manager::{CatalogInfo, SystemCatalogs};
pub use providers::{
    DatabaseCatalog, DatabaseCatalogObject, SchemaCatalog, SchemaCatalogObject, TableCatalog,
    TableCatalogObject, TriggerCatalog,
};
pub use registry::CatalogRegistry;
pub use traits::{CatalogProvider, CatalogSchema, TriggerCacheInvalidation};
