// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! relcat CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{handlers, Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose wins over --log-level; RUST_LOG still applies per module
    let log_level = match (cli.verbose, cli.log_level) {
        (true, _) => log::LevelFilter::Debug,
        (false, Some(level)) => level.to_level_filter(),
        (false, None) => log::LevelFilter::Warn,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let path = cli.path.as_path();
    match &cli.command {
        Commands::Version => {
            println!("{} {}", "relcat".bold().green(), relcat::VERSION);
            println!("Transactional system catalog");
            Ok(())
        }
        Commands::Init => handlers::handle_init(path, cli.memory, cli.format),
        Commands::Schemas => handlers::handle_schemas(path, cli.memory, cli.format),
        Commands::CreateSchema { name } => handlers::handle_create_schema(path, cli.memory, name),
        Commands::DropSchema { name } => handlers::handle_drop_schema(path, cli.memory, name),
        Commands::Tables { database } => {
            handlers::handle_tables(path, cli.memory, database, cli.format)
        }
        Commands::Triggers { database, table } => {
            handlers::handle_triggers(path, cli.memory, database, table, cli.format)
        }
        Commands::Catalogs => handlers::handle_catalogs(path, cli.memory, cli.format),
    }
}
