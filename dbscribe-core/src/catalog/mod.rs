//! Catalog reader trait and factory.
//!
//! A [`CatalogReader`] produces one [`CatalogSnapshot`] per run. Readers are
//! object safe so the CLI can hold a `Box<dyn CatalogReader>` and tests can
//! substitute an in-memory fixture for a live server.

use async_trait::async_trait;

use crate::{Result, config::ConnectionConfig, models::CatalogSnapshot, security::Credentials};

pub mod queries;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "mssql")]
mod rows;

/// Reads the metadata catalog of one database.
///
/// # Security Guarantees
/// - All operations are read-only
/// - Credentials are never logged or included in errors
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Opens a connection and runs a trivial query.
    ///
    /// # Errors
    /// Returns an error if the connection fails or times out
    async fn test_connection(&self) -> Result<()>;

    /// Reads the whole catalog.
    ///
    /// Row order is whatever the server returns; renderers sort.
    ///
    /// # Errors
    /// Returns an error on connection failure or on the first failing query.
    /// No partial snapshot is ever returned.
    async fn read_catalog(&self) -> Result<CatalogSnapshot>;

    /// Connection description safe for logs (no credentials)
    fn safe_description(&self) -> String;
}

/// Creates a catalog reader for the configured server.
///
/// # Errors
/// Returns a configuration error when the connection settings are invalid
/// or when the binary was built without a database driver.
#[cfg(feature = "mssql")]
pub fn create_reader(
    connection: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<Box<dyn CatalogReader>> {
    let reader = mssql::SqlServerReader::new(connection, credentials)?;
    Ok(Box::new(reader))
}

/// Creates a catalog reader for the configured server.
///
/// # Errors
/// Always fails: this build has no database driver.
#[cfg(not(feature = "mssql"))]
pub fn create_reader(
    connection: &ConnectionConfig,
    _credentials: &Credentials,
) -> Result<Box<dyn CatalogReader>> {
    connection.validate()?;
    Err(crate::error::DbScribeError::configuration(
        "SQL Server support not compiled in. Rebuild with --features mssql",
    ))
}
