//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use dbscribe_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

/// Top-level arguments
#[derive(Parser, Debug)]
#[command(name = "dbscribe")]
#[command(about = "Generate markdown documentation from a SQL Server catalog")]
#[command(version)]
#[command(long_about = "
dbscribe - SQL Server catalog documentation

Reads tables, views, stored procedures and functions from the sys.* catalog
views and writes one markdown file per object plus an index.md grouped by
schema.

SECURITY FEATURES:
- Read-only catalog queries only
- Passwords never stored in output or logs
- Password from config, DBSCRIBE_PASSWORD or an interactive prompt

EXAMPLES:
  dbscribe init
  dbscribe test
  dbscribe --config prod.json --output docs/prod
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `generate` run
    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read the catalog and write the documentation (default)
    Generate(GenerateArgs),
    /// Test the database connection
    Test,
    /// Write a sample configuration file
    Init(InitArgs),
}

/// Options for `generate`
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Output folder
    #[arg(
        short,
        long,
        help = "Output folder (overrides output_dir from the configuration)"
    )]
    pub output: Option<PathBuf>,

    /// Also write catalog.json
    #[arg(long, help = "Also write the raw catalog snapshot as catalog.json")]
    pub json: bool,
}

/// Options for `init`
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long, help = "Overwrite an existing configuration file")]
    pub force: bool,
}

/// Flags accepted by every subcommand
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "DBSCRIBE_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        help = "Path to the JSON configuration file"
    )]
    pub config: PathBuf,

    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

impl Cli {
    /// The command to run; no subcommand means `generate`.
    ///
    /// `generate` options given before the subcommand name are merged
    /// into the ones given after it.
    pub fn resolved_command(&self) -> Command {
        match &self.command {
            Some(Command::Generate(args)) => Command::Generate(GenerateArgs {
                output: args.output.clone().or_else(|| self.generate.output.clone()),
                json: args.json || self.generate.json,
            }),
            Some(Command::Test) => Command::Test,
            Some(Command::Init(args)) => Command::Init(InitArgs { force: args.force }),
            None => Command::Generate(self.generate.clone()),
        }
    }
}
