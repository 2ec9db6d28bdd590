//! dbscribe: markdown documentation for SQL Server databases.
//!
//! # Security Guarantees
//! - Read-only catalog queries only
//! - No credentials stored or logged

use anyhow::Context;
use clap::Parser;
use dbscribe::{Cli, Command, commands};
use dbscribe_core::{DbScribeError, logging::init_logging};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let config_path = cli.global.config.as_path();
    let result = run(&cli, config_path).await;

    if let Err(DbScribeError::ConfigNotFound { path }) = &result {
        eprintln!("Error: configuration file not found: {}", path.display());
        eprintln!("Run `dbscribe init` to create one, or pass --config <PATH>");
        std::process::exit(1);
    }

    result.with_context(|| format!("dbscribe failed (config: {})", config_path.display()))
}

async fn run(cli: &Cli, config_path: &Path) -> dbscribe_core::Result<()> {
    match cli.resolved_command() {
        Command::Generate(args) => {
            let summary = commands::generate(config_path, args.output, args.json).await?;
            if !cli.global.quiet {
                println!("Documentation written to {}", summary.output_dir.display());
                println!(
                    "Tables: {}, views: {}, routines: {} ({} files)",
                    summary.tables, summary.views, summary.routines, summary.documents
                );
                if let Some(json) = &summary.catalog_json {
                    println!("Catalog snapshot: {}", json.display());
                }
            }
        }
        Command::Test => {
            let target = commands::test_connection(config_path).await?;
            if !cli.global.quiet {
                println!("Connection to {target} successful");
            }
        }
        Command::Init(args) => {
            commands::init(config_path, args.force).await?;
            if !cli.global.quiet {
                println!("Wrote sample configuration to {}", config_path.display());
                println!("Edit the connection section, then run `dbscribe`");
            }
        }
    }
    Ok(())
}
