//! Configuration file handling.
//!
//! The configuration is a single JSON document:
//! - `connection`: SQL Server connection settings ([`ConnectionConfig`])
//! - `output_dir`: folder that receives the markdown files
//! - `schemas`: include/exclude schema filter ([`SchemaFilter`])
//! - `emit_json`: also write the raw catalog snapshot as `catalog.json`

mod connection;
mod filter;

pub use connection::ConnectionConfig;
pub use filter::SchemaFilter;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DbScribeError;

/// Default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dbscribe.json";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database connection settings
    pub connection: ConnectionConfig,
    /// Folder that receives the generated documents
    pub output_dir: PathBuf,
    /// Schema include/exclude filter
    pub schemas: SchemaFilter,
    /// Also write the catalog snapshot as JSON
    pub emit_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            output_dir: PathBuf::from("docs/database"),
            schemas: SchemaFilter::default(),
            emit_json: false,
        }
    }
}

impl AppConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// - [`DbScribeError::ConfigNotFound`] when the file does not exist
    /// - [`DbScribeError::Io`] when it cannot be read
    /// - [`DbScribeError::Serialization`] when it is not valid JSON
    /// - [`DbScribeError::Configuration`] when a value is invalid
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DbScribeError::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(DbScribeError::io(
                    format!("Failed to read {}", path.display()),
                    e,
                ));
            }
        };

        let config = Self::from_json(&contents).map_err(|e| match e {
            DbScribeError::Serialization { source, .. } => DbScribeError::Serialization {
                context: format!("Invalid configuration in {}", path.display()),
                source,
            },
            other => other,
        })?;

        tracing::debug!(
            "Loaded configuration from {}: {}",
            path.display(),
            config.connection
        );
        Ok(config)
    }

    /// Parses and validates configuration JSON.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or a value is invalid
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DbScribeError::Serialization {
                context: "Invalid configuration".to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    ///
    /// # Errors
    /// Returns error if any value is invalid
    pub fn validate(&self) -> crate::Result<()> {
        self.connection.validate()?;

        if self.output_dir.as_os_str().is_empty() {
            return Err(DbScribeError::configuration("output_dir cannot be empty"));
        }

        Ok(())
    }

    /// Sample configuration written by `dbscribe init`.
    pub fn sample() -> Self {
        Self {
            connection: ConnectionConfig::new("localhost".to_string())
                .with_port(1433)
                .with_database("MyDatabase".to_string())
                .with_username("doc_reader".to_string()),
            ..Default::default()
        }
    }

    /// Pretty JSON for the sample file.
    ///
    /// `password` and `connection_string` are always written as `null` so
    /// the keys show up in the file without their values. The output is
    /// safe to commit.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_pretty_json(&self) -> crate::Result<String> {
        let serialization = |e| DbScribeError::Serialization {
            context: "Failed to serialize configuration".to_string(),
            source: e,
        };

        let mut value = serde_json::to_value(self).map_err(serialization)?;
        if let Some(connection) = value
            .get_mut("connection")
            .and_then(serde_json::Value::as_object_mut)
        {
            for key in ["password", "connection_string"] {
                connection.insert(key.to_string(), serde_json::Value::Null);
            }
        }

        serde_json::to_string_pretty(&value).map_err(serialization)
    }
}
