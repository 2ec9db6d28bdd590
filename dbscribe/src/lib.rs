//! dbscribe command-line application.
//!
//! The binary in `main.rs` only parses arguments and reports errors; the
//! commands and the output writer live here so they can be tested without
//! a terminal.

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::{Cli, Command};
pub use commands::{RunSummary, document_catalog, generate, init, test_connection};
