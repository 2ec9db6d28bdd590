//! Command implementations.

use dbscribe_core::{
    AppConfig, CatalogReader, ConnectionConfig, Credentials, DbScribeError, ObjectKind, Result,
    create_reader, render_all,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::output::{write_catalog_json, write_documents};

/// Environment variable consulted when the config file has no password.
pub const PASSWORD_ENV: &str = "DBSCRIBE_PASSWORD";

/// What a documentation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Folder the documents were written to
    pub output_dir: PathBuf,
    /// Number of markdown files written, index included
    pub documents: usize,
    /// Documented tables
    pub tables: usize,
    /// Documented views
    pub views: usize,
    /// Documented procedures and functions
    pub routines: usize,
    /// Path of `catalog.json` when it was written
    pub catalog_json: Option<PathBuf>,
}

/// Moves the login out of `connection`, filling in a missing password.
///
/// Lookup order: configuration file, then `env_password`, then `prompt`.
/// The prompt is only called when a password is still missing.
///
/// # Errors
/// Returns error if the prompt fails
pub fn resolve_credentials<F>(
    connection: &mut ConnectionConfig,
    env_password: Option<String>,
    prompt: F,
) -> Result<Credentials>
where
    F: FnOnce(&str) -> std::io::Result<String>,
{
    let needs_password = connection.needs_password();
    let mut credentials = connection.take_credentials();

    if needs_password {
        let password = match env_password {
            Some(password) => password,
            None => prompt(credentials.username())
                .map_err(|e| DbScribeError::io("Failed to read password", e))?,
        };
        credentials.set_password(password);
    }

    Ok(credentials)
}

/// Interactive password prompt on the terminal.
///
/// # Errors
/// Returns error if the terminal cannot be read
pub fn prompt_password(username: &str) -> std::io::Result<String> {
    rpassword::prompt_password(format!("Password for {username}: "))
}

/// Reads the catalog, applies the schema filter and writes all documents.
///
/// # Errors
/// Returns error if reading, rendering or writing fails; nothing is written
/// when the read fails
pub async fn document_catalog(
    reader: &dyn CatalogReader,
    config: &AppConfig,
) -> Result<RunSummary> {
    info!("Reading catalog from {}", reader.safe_description());

    let mut snapshot = reader.read_catalog().await.map_err(|e| {
        error!("Catalog read failed: {}", e);
        e
    })?;

    if !config.schemas.is_empty() {
        let before = snapshot.objects.len();
        snapshot.retain_schemas(|schema| config.schemas.allows(schema));
        info!(
            "Schema filter kept {} of {} objects",
            snapshot.objects.len(),
            before
        );
    }

    let documents = render_all(&snapshot)?;
    let written = write_documents(&config.output_dir, &documents).await?;

    let catalog_json = if config.emit_json {
        Some(write_catalog_json(&config.output_dir, &snapshot).await?)
    } else {
        None
    };

    Ok(RunSummary {
        output_dir: config.output_dir.clone(),
        documents: written,
        tables: snapshot.count(|k| k == ObjectKind::Table),
        views: snapshot.count(|k| k == ObjectKind::View),
        routines: snapshot.count(ObjectKind::is_routine),
        catalog_json,
    })
}

/// Loads the config, resolves the login and builds a reader.
async fn connect(config_path: &Path) -> Result<(AppConfig, Box<dyn CatalogReader>)> {
    let mut config = AppConfig::load(config_path).await?;
    let credentials = resolve_credentials(
        &mut config.connection,
        std::env::var(PASSWORD_ENV).ok(),
        prompt_password,
    )?;
    let reader = create_reader(&config.connection, &credentials)?;
    Ok((config, reader))
}

/// `dbscribe generate`
///
/// # Errors
/// Returns [`DbScribeError::ConfigNotFound`] when the config file is
/// missing, otherwise any connection, collection or write error
pub async fn generate(
    config_path: &Path,
    output_override: Option<PathBuf>,
    emit_json: bool,
) -> Result<RunSummary> {
    let (mut config, reader) = connect(config_path).await?;

    if let Some(output_dir) = output_override {
        config.output_dir = output_dir;
    }
    config.emit_json |= emit_json;

    info!("Output: {}", config.output_dir.display());
    document_catalog(reader.as_ref(), &config).await
}

/// `dbscribe test`
///
/// # Errors
/// Returns error if the config cannot be loaded or the connection fails
pub async fn test_connection(config_path: &Path) -> Result<String> {
    let (_, reader) = connect(config_path).await?;
    info!("Testing connection to {}", reader.safe_description());

    reader.test_connection().await.map_err(|e| {
        error!("Connection test failed: {}", e);
        e
    })?;

    Ok(reader.safe_description())
}

/// `dbscribe init`: writes a sample configuration file.
///
/// # Errors
/// Returns a configuration error if the file exists and `force` is not set,
/// or an I/O error if it cannot be written
pub async fn init(config_path: &Path, force: bool) -> Result<()> {
    let exists = tokio::fs::try_exists(config_path).await.map_err(|e| {
        DbScribeError::io(format!("Failed to check {}", config_path.display()), e)
    })?;
    if exists && !force {
        return Err(DbScribeError::configuration(format!(
            "{} already exists, use --force to overwrite it",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            DbScribeError::io(format!("Failed to create {}", parent.display()), e)
        })?;
    }

    let json = AppConfig::sample().to_pretty_json()?;
    tokio::fs::write(config_path, json + "\n")
        .await
        .map_err(|e| DbScribeError::io(format!("Failed to write to {}", config_path.display()), e))?;

    info!("Wrote sample configuration to {}", config_path.display());
    Ok(())
}
