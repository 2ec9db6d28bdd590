//! The `index.md` summary document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use askama::Template;

use super::{Document, DocumentPaths, INDEX_FILE, link_label, sorted_objects};
use crate::{
    Result,
    error::DbScribeError,
    models::{CatalogObject, CatalogSnapshot, ObjectKind},
};

struct Entry {
    title: String,
    link: String,
    suffix: String,
}

struct Group {
    title: &'static str,
    entries: Vec<Entry>,
}

struct SchemaSection {
    name: String,
    groups: Vec<Group>,
}

#[derive(Template)]
#[template(path = "index.md", escape = "none")]
struct IndexTemplate {
    database: String,
    version: String,
    tables: usize,
    views: usize,
    routines: usize,
    schemas: Vec<SchemaSection>,
}

fn entry(paths: &DocumentPaths, object: &CatalogObject) -> Entry {
    Entry {
        title: link_label(&object.qualified_name()),
        link: paths.link(object),
        suffix: if object.kind.is_routine() {
            format!(" ({})", object.kind.label())
        } else {
            String::new()
        },
    }
}

/// Per-schema sections with `Tables`, `Views` and `Routines` groups.
/// Empty groups are left out.
fn schema_sections(snapshot: &CatalogSnapshot, paths: &DocumentPaths) -> Vec<SchemaSection> {
    let mut by_schema: BTreeMap<&str, Vec<&CatalogObject>> = BTreeMap::new();
    for object in sorted_objects(snapshot) {
        by_schema.entry(object.schema.as_str()).or_default().push(object);
    }

    by_schema
        .into_iter()
        .map(|(name, objects)| {
            let pick = |title: &'static str, keep: fn(ObjectKind) -> bool| Group {
                title,
                entries: objects
                    .iter()
                    .filter(|o| keep(o.kind))
                    .map(|o| entry(paths, o))
                    .collect(),
            };

            let groups = [
                pick("Tables", |k| k == ObjectKind::Table),
                pick("Views", |k| k == ObjectKind::View),
                pick("Routines", ObjectKind::is_routine),
            ]
            .into_iter()
            .filter(|g| !g.entries.is_empty())
            .collect();

            SchemaSection {
                name: name.to_string(),
                groups,
            }
        })
        .collect()
}

/// Builds `index.md`: database title, totals and per-schema links.
///
/// Links point at the file names chosen by `paths`.
///
/// # Errors
/// Returns [`DbScribeError::Render`] if the template fails to render
pub fn build_summary(snapshot: &CatalogSnapshot, paths: &DocumentPaths) -> Result<Document> {
    let template = IndexTemplate {
        database: snapshot.database.name.clone(),
        version: snapshot
            .database
            .product_version
            .clone()
            .unwrap_or_default(),
        tables: snapshot.count(|k| k == ObjectKind::Table),
        views: snapshot.count(|k| k == ObjectKind::View),
        routines: snapshot.count(ObjectKind::is_routine),
        schemas: schema_sections(snapshot, paths),
    };

    let rendered = template
        .render()
        .map_err(|e| DbScribeError::render_failed(INDEX_FILE, e))?;

    Ok(Document::new(PathBuf::from(INDEX_FILE), &rendered))
}
