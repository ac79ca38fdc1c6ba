// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// relcat - bootstrap and inspect a system catalog
#[derive(Parser, Debug)]
#[command(name = "relcat")]
#[command(version)]
#[command(about = "Bootstrap and inspect a relcat system catalog", long_about = None)]
pub struct Cli {
    /// Database directory
    #[arg(long = "path", global = true, default_value = "./relcat.db")]
    pub path: PathBuf,

    /// Use volatile in-memory storage instead of --path
    #[arg(long = "memory", global = true)]
    pub memory: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<LogLevel>,

    /// Output format
    #[arg(long = "format", global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the catalog tables and bootstrap rows
    Init,

    /// List namespaces
    Schemas,

    /// Create a namespace
    CreateSchema {
        /// Schema name
        name: String,
    },

    /// Drop a namespace
    DropSchema {
        /// Schema name
        name: String,
    },

    /// List tables of a database
    Tables {
        /// Database name
        #[arg(long = "database", default_value = "pg_catalog")]
        database: String,
    },

    /// List triggers of a table
    Triggers {
        /// Database name
        #[arg(long = "database")]
        database: String,

        /// Table name
        #[arg(long = "table")]
        table: String,
    },

    /// Describe the catalog tables
    Catalogs,

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
