// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog provider trait definition
//!
//! This module defines the traits shared by the concrete catalogs and the
//! interface tables expose to catalogs that cache metadata inside them.

use super::abstract_catalog::AbstractCatalog;
use crate::trigger::TriggerList;
use crate::txn::TransactionId;
use crate::types::Oid;
use serde::{Deserialize, Serialize};

/// Schema information for a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSchema {
    /// Name of the backing catalog table
    pub name: String,
    /// Version of the catalog implementation
    pub version: String,
    pub table_oid: Oid,
    /// Column names in on-disk order
    pub columns: Vec<String>,
    /// Index names in offset order
    pub indexes: Vec<String>,
}

/// Common surface of every concrete catalog
///
/// Implementing this trait lets the catalog be listed and described by
/// [`SystemCatalogs`](super::manager::SystemCatalogs) without knowing its type.
pub trait CatalogProvider: Send + Sync {
    /// Name of the backing catalog table
    fn name(&self) -> &str;

    /// Shared row-level primitives and the backing table
    fn catalog(&self) -> &AbstractCatalog;

    /// Operation names this catalog supports
    ///
    /// # Returns
    /// * `Vec<String>` of supported operation names
    fn supported_operations(&self) -> Vec<String>;

    /// Describe the backing table
    ///
    /// # Returns
    /// * `CatalogSchema` built from the table's columns and indexes
    fn schema(&self) -> CatalogSchema {
        let table = self.catalog().table();
        CatalogSchema {
            name: self.name().to_string(),
            version: crate::VERSION.to_string(),
            table_oid: table.oid(),
            columns: table.schema().column_names(),
            indexes: table.indexes().into_iter().map(|i| i.name).collect(),
        }
    }
}

/// Receiver of trigger lists computed by the trigger catalog
///
/// A list computed inside a transaction is staged for that transaction only.
/// It becomes the shared list when the transaction commits and is thrown away
/// when it aborts. Readers outside the transaction keep the committed list.
pub trait TriggerCacheInvalidation: Send + Sync {
    /// Stage `triggers` as seen by `txn_id`. Returns true the first time the
    /// transaction stages a list on this receiver.
    fn stage_triggers(&self, txn_id: TransactionId, triggers: TriggerList) -> bool;

    /// Make the list staged by `txn_id` the committed one. If another
    /// transaction published in between, the cache is invalidated instead.
    fn publish_triggers(&self, txn_id: TransactionId);

    /// Forget the list staged by `txn_id`
    fn discard_triggers(&self, txn_id: TransactionId);

    /// Drop the committed list; the next reader must reload it
    fn invalidate_triggers(&self);
}
