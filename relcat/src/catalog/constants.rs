// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reserved OIDs and names of the system catalogs

use crate::types::Oid;

/// Database that holds every catalog table
pub const CATALOG_DATABASE_OID: Oid = Oid(1);
pub const CATALOG_DATABASE_NAME: &str = "pg_catalog";

/// Namespace rows created at bootstrap
pub const CATALOG_SCHEMA_OID: Oid = Oid(2);
pub const CATALOG_SCHEMA_NAME: &str = "pg_catalog";
pub const DEFAULT_SCHEMA_OID: Oid = Oid(3);
pub const DEFAULT_SCHEMA_NAME: &str = "public";

pub const DATABASE_CATALOG_OID: Oid = Oid(10);
pub const TABLE_CATALOG_OID: Oid = Oid(11);
pub const SCHEMA_CATALOG_OID: Oid = Oid(12);
pub const TRIGGER_CATALOG_OID: Oid = Oid(13);

pub const DATABASE_CATALOG_NAME: &str = "pg_database";
pub const TABLE_CATALOG_NAME: &str = "pg_table";
pub const SCHEMA_CATALOG_NAME: &str = "pg_namespace";
pub const TRIGGER_CATALOG_NAME: &str = "pg_trigger";

/// First OID handed out for rows created after bootstrap
pub const FIRST_USER_OID: u32 = 1000;

/// Name of the tree persisting user table descriptors
pub const TABLE_DESCRIPTOR_TREE: &str = "relcat.tables";
