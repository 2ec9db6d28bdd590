//! Core library for dbscribe.
//!
//! dbscribe reads the metadata catalog of a SQL Server database and renders
//! it as markdown: one document per table, view and routine plus an index
//! grouped by schema.
//!
//! # Security Guarantees
//! - All catalog queries are read-only `SELECT`s against `sys.*` views
//! - Passwords are held in zeroizing containers and never logged
//! - Connection strings are never echoed in errors
//!
//! # Pipeline
//! 1. [`catalog::CatalogReader::read_catalog`] produces a [`CatalogSnapshot`]
//! 2. [`render::render_all`] turns it into [`render::Document`]s
//!
//! Rows are kept in catalog order; all sorting happens during rendering.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod render;
pub mod security;
pub mod type_render;

// Re-export commonly used types
pub use catalog::{CatalogReader, create_reader};
pub use config::{AppConfig, ConnectionConfig, SchemaFilter};
pub use error::{DbScribeError, Result};
pub use models::{
    CatalogObject, CatalogSnapshot, CheckConstraint, Column, DatabaseInfo, ForeignKeyPart,
    IndexPart, KeyKind, KeyPart, ObjectKind, Parameter, TypeDescriptor,
};
pub use render::{Document, DocumentPaths, render_all};
pub use security::Credentials;
