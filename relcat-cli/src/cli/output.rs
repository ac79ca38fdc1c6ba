// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use relcat::catalog::{CatalogInfo, SchemaCatalogObject, TableCatalogObject};
use relcat::TriggerList;

use super::commands::OutputFormat;

/// Result formatter for the supported output formats
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn format_schemas(schemas: &[SchemaCatalogObject], format: OutputFormat) -> String {
        let rows = schemas
            .iter()
            .map(|s| vec![s.schema_oid.to_string(), s.schema_name.clone()])
            .collect();
        Self::format(&["schema_oid", "schema_name"], rows, format)
    }

    pub fn format_tables(tables: &[TableCatalogObject], format: OutputFormat) -> String {
        let rows = tables
            .iter()
            .map(|t| {
                vec![
                    t.table_oid.to_string(),
                    t.table_name.clone(),
                    t.schema_name.clone(),
                    t.database_oid.to_string(),
                ]
            })
            .collect();
        Self::format(
            &["table_oid", "table_name", "schema_name", "database_oid"],
            rows,
            format,
        )
    }

    pub fn format_triggers(triggers: &TriggerList, format: OutputFormat) -> String {
        let rows = triggers
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    t.trigger_type.to_string(),
                    t.function_name.clone(),
                    t.function_args.clone(),
                    t.fire_condition
                        .as_ref()
                        .map(|c| format!("{} bytes", c.len()))
                        .unwrap_or_else(|| "NULL".to_string()),
                    t.timestamp
                        .map(|ts| ts.to_rfc3339())
                        .unwrap_or_else(|| "NULL".to_string()),
                ]
            })
            .collect();
        Self::format(
            &["name", "type", "function", "args", "condition", "created"],
            rows,
            format,
        )
    }

    pub fn format_catalogs(catalogs: &[CatalogInfo], format: OutputFormat) -> String {
        let rows = catalogs
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.schema.table_oid.to_string(),
                    c.schema.columns.join(", "),
                    c.schema.indexes.join(", "),
                ]
            })
            .collect();
        Self::format(&["catalog", "oid", "columns", "indexes"], rows, format)
    }

    fn format(headers: &[&str], rows: Vec<Vec<String>>, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(headers, rows),
            OutputFormat::Json => Self::format_json(headers, rows),
        }
    }

    /// Format rows as a table using comfy-table
    fn format_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
        if rows.is_empty() {
            return format!("{}\n", "No results found".yellow());
        }

        let count = rows.len();
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for row in rows {
            table.add_row(row);
        }

        format!("{}\n{}\n", table, format!("{} row(s)", count).dimmed())
    }

    /// Format rows as a JSON array of objects
    fn format_json(headers: &[&str], rows: Vec<Vec<String>>) -> String {
        let objects: Vec<serde_json::Value> = rows
            .into_iter()
            .map(|row| {
                let map: serde_json::Map<String, serde_json::Value> = headers
                    .iter()
                    .zip(row)
                    .map(|(h, v)| (h.to_string(), serde_json::Value::String(v)))
                    .collect();
                serde_json::Value::Object(map)
            })
            .collect();
        let mut text = serde_json::to_string_pretty(&objects)
            .unwrap_or_else(|_| "{\"status\": \"error\"}".to_string());
        text.push('\n');
        text
    }
}
