//! Writes rendered documents into the output folder.
//!
//! Layout: `index.md`, `tables/`, `views/`, `routines/` and an optional
//! `catalog.json`. Folders are created as needed and existing files are
//! overwritten.

use dbscribe_core::{CatalogSnapshot, DbScribeError, Document, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File name of the optional JSON snapshot.
pub const CATALOG_JSON: &str = "catalog.json";

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| DbScribeError::io(format!("Failed to create {}", path.display()), e))
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| DbScribeError::io(format!("Failed to write to {}", path.display()), e))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Writes every document below `output_dir`.
///
/// Stops at the first failed write.
///
/// # Errors
/// Returns [`DbScribeError::Io`] naming the path that could not be created
/// or written
pub async fn write_documents(output_dir: &Path, documents: &[Document]) -> Result<usize> {
    let folders: BTreeSet<PathBuf> = documents
        .iter()
        .filter_map(|d| d.relative_path.parent())
        .map(|parent| output_dir.join(parent))
        .chain(std::iter::once(output_dir.to_path_buf()))
        .collect();

    for folder in &folders {
        create_dir(folder).await?;
    }

    for document in documents {
        write_file(
            &output_dir.join(&document.relative_path),
            document.content.as_bytes(),
        )
        .await?;
    }

    tracing::info!(
        "Wrote {} documents to {}",
        documents.len(),
        output_dir.display()
    );
    Ok(documents.len())
}

/// Writes the snapshot as pretty JSON to `catalog.json`.
///
/// # Errors
/// Returns error if serialization or the write fails
pub async fn write_catalog_json(output_dir: &Path, snapshot: &CatalogSnapshot) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|e| {
        DbScribeError::Serialization {
            context: "Failed to serialize catalog snapshot".to_string(),
            source: e,
        }
    })?;

    create_dir(output_dir).await?;
    let path = output_dir.join(CATALOG_JSON);
    write_file(&path, json.as_bytes()).await?;
    Ok(path)
}
