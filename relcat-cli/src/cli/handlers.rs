// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for relcat

use colored::Colorize;
use std::path::Path;

use super::commands::OutputFormat;
use super::output::ResultFormatter;
use relcat::txn::AccessMode;
use relcat::{CatalogConfig, SystemCatalogs};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn open(path: &Path, memory: bool) -> Result<SystemCatalogs, Box<dyn std::error::Error>> {
    let config = if memory {
        CatalogConfig::in_memory()
    } else {
        if !path.exists() {
            return Err(format!(
                "No catalog at {:?}. Run `relcat init --path {:?}` first.",
                path, path
            )
            .into());
        }
        CatalogConfig::persistent(path)
    };
    Ok(SystemCatalogs::bootstrap(config)?)
}

/// Handle the init command
///
/// Bootstrapping is idempotent: an existing catalog is reopened and any
/// missing bootstrap rows are added.
pub fn handle_init(path: &Path, memory: bool, format: OutputFormat) -> CliResult {
    println!("{}", "Initializing relcat...".bold().green());
    let catalogs = if memory {
        SystemCatalogs::bootstrap(CatalogConfig::in_memory())?
    } else {
        std::fs::create_dir_all(path)?;
        SystemCatalogs::bootstrap(CatalogConfig::persistent(path))?
    };

    print!(
        "{}",
        ResultFormatter::format_catalogs(&catalogs.list_catalog_info(), format)
    );
    catalogs.shutdown()?;

    if memory {
        println!("{}", "\nIn-memory catalog bootstrapped (nothing persisted)".yellow());
    } else {
        println!(
            "{}",
            format!("\nrelcat initialized at {:?}", path).green()
        );
    }
    Ok(())
}

pub fn handle_schemas(path: &Path, memory: bool, format: OutputFormat) -> CliResult {
    let catalogs = open(path, memory)?;
    let txn = catalogs.begin(AccessMode::ReadOnly);
    let schemas = catalogs.schemas().get_schema_objects(&txn)?;
    catalogs.commit(&txn)?;
    print!("{}", ResultFormatter::format_schemas(&schemas, format));
    catalogs.shutdown()?;
    Ok(())
}

pub fn handle_create_schema(path: &Path, memory: bool, name: &str) -> CliResult {
    let catalogs = open(path, memory)?;
    let txn = catalogs.begin(AccessMode::ReadWrite);
    match catalogs.create_schema(name, &txn) {
        Ok(oid) => {
            catalogs.commit(&txn)?;
            println!("{}", format!("Created schema '{}' (oid {})", name, oid).green());
        }
        Err(e) => {
            catalogs.abort(&txn)?;
            return Err(e.into());
        }
    }
    catalogs.shutdown()?;
    Ok(())
}

pub fn handle_drop_schema(path: &Path, memory: bool, name: &str) -> CliResult {
    let catalogs = open(path, memory)?;
    let txn = catalogs.begin(AccessMode::ReadWrite);
    if let Err(e) = catalogs.drop_schema(name, &txn) {
        catalogs.abort(&txn)?;
        return Err(e.into());
    }
    catalogs.commit(&txn)?;
    println!("{}", format!("Dropped schema '{}'", name).green());
    catalogs.shutdown()?;
    Ok(())
}

pub fn handle_tables(path: &Path, memory: bool, database: &str, format: OutputFormat) -> CliResult {
    let catalogs = open(path, memory)?;
    let txn = catalogs.begin(AccessMode::ReadOnly);
    let database_object = catalogs
        .databases()
        .get_database_object_by_name(database, &txn)?
        .ok_or_else(|| format!("Database '{}' not found", database))?;
    let tables = catalogs
        .tables()
        .get_table_objects(database_object.database_oid, &txn)?;
    catalogs.commit(&txn)?;
    print!("{}", ResultFormatter::format_tables(&tables, format));
    catalogs.shutdown()?;
    Ok(())
}

pub fn handle_triggers(
    path: &Path,
    memory: bool,
    database: &str,
    table: &str,
    format: OutputFormat,
) -> CliResult {
    let catalogs = open(path, memory)?;
    let txn = catalogs.begin(AccessMode::ReadOnly);
    let database_object = catalogs
        .databases()
        .get_database_object_by_name(database, &txn)?
        .ok_or_else(|| format!("Database '{}' not found", database))?;
    let table_object = catalogs
        .tables()
        .get_table_object_by_name(table, database_object.database_oid, &txn)?
        .ok_or_else(|| format!("Table '{}.{}' not found", database, table))?;
    let triggers = catalogs.triggers().get_triggers(table_object.table_oid, &txn)?;
    catalogs.commit(&txn)?;
    print!("{}", ResultFormatter::format_triggers(&triggers, format));
    catalogs.shutdown()?;
    Ok(())
}

pub fn handle_catalogs(path: &Path, memory: bool, format: OutputFormat) -> CliResult {
    let catalogs = open(path, memory)?;
    print!(
        "{}",
        ResultFormatter::format_catalogs(&catalogs.list_catalog_info(), format)
    );
    catalogs.shutdown()?;
    Ok(())
}
