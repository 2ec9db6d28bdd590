//! Per-object documents.

use std::collections::BTreeMap;

use askama::Template;

use super::{
    Document, DocumentPaths, NONE, code_cell, escape_cell, link_label, sql_block,
};
use crate::{
    Result,
    error::DbScribeError,
    models::{CatalogObject, CatalogSnapshot, Column, ForeignKeyPart, KeyKind, ObjectKind},
};

/// One row of a columns table.
struct ColumnRow {
    ordinal: i32,
    name: String,
    data_type: String,
    nullable: &'static str,
    identity: &'static str,
    default_value: String,
    computed: String,
    description: String,
}

impl ColumnRow {
    fn from_column(column: &Column) -> Self {
        Self {
            ordinal: column.ordinal,
            name: escape_cell(&column.name),
            data_type: format!("`{}`", escape_cell(&column.data_type.to_string())),
            nullable: if column.is_nullable { "yes" } else { "no" },
            identity: if column.is_identity { "yes" } else { "" },
            default_value: code_cell(column.default_expression.as_deref()),
            computed: code_cell(column.computed_expression.as_deref()),
            description: column
                .description
                .as_deref()
                .map(escape_cell)
                .unwrap_or_default(),
        }
    }
}

struct KeyRow {
    name: String,
    columns: String,
}

struct ForeignKeyRow {
    name: String,
    columns: String,
    target: String,
    on_delete: String,
    on_update: String,
}

struct ReferenceRow {
    source: String,
    name: String,
    columns: String,
}

struct CheckRow {
    name: String,
    column: String,
    expression: String,
}

struct IndexRow {
    name: String,
    index_type: String,
    unique: &'static str,
    columns: String,
    included: String,
}

struct ParameterRow {
    ordinal: i32,
    name: String,
    data_type: String,
    direction: &'static str,
}

#[derive(Template)]
#[template(path = "table.md", escape = "none")]
struct TableTemplate {
    qualified_name: String,
    description: String,
    columns: Vec<ColumnRow>,
    primary_key: Vec<KeyRow>,
    unique_keys: Vec<KeyRow>,
    foreign_keys: Vec<ForeignKeyRow>,
    referenced_by: Vec<ReferenceRow>,
    checks: Vec<CheckRow>,
    indexes: Vec<IndexRow>,
}

#[derive(Template)]
#[template(path = "view.md", escape = "none")]
struct ViewTemplate {
    qualified_name: String,
    description: String,
    columns: Vec<ColumnRow>,
    definition: String,
}

#[derive(Template)]
#[template(path = "routine.md", escape = "none")]
struct RoutineTemplate {
    kind_label: &'static str,
    qualified_name: String,
    description: String,
    parameters: Vec<ParameterRow>,
    returns: String,
    definition: String,
}

/// Builds the markdown document for one table, view or routine.
///
/// `paths` names this document and the documents it links to.
///
/// # Errors
/// Returns [`DbScribeError::Render`] if the template fails to render
pub fn build_report(
    snapshot: &CatalogSnapshot,
    paths: &DocumentPaths,
    object: &CatalogObject,
) -> Result<Document> {
    let path = paths.path(object);
    let rendered = match object.kind {
        ObjectKind::Table => table_template(snapshot, paths, object).render(),
        ObjectKind::View => view_template(snapshot, object).render(),
        _ => routine_template(snapshot, object).render(),
    }
    .map_err(|e| DbScribeError::render_failed(path.display().to_string(), e))?;

    Ok(Document::new(path, &rendered))
}

fn description_of(object: &CatalogObject) -> String {
    object
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn column_rows(snapshot: &CatalogSnapshot, object_id: i32) -> Vec<ColumnRow> {
    snapshot
        .columns_of(object_id)
        .into_iter()
        .map(ColumnRow::from_column)
        .collect()
}

/// Escaped column names joined with commas.
fn column_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(escape_cell)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Link to another object's document from inside a kind folder, or the
/// bare name when the object was not read.
fn object_reference(
    snapshot: &CatalogSnapshot,
    paths: &DocumentPaths,
    object_id: i32,
    schema: &str,
    name: &str,
) -> String {
    let qualified = format!("{schema}.{name}");
    match snapshot.object(object_id) {
        Some(target) => format!("[{}](../{})", link_label(&qualified), paths.link(target)),
        None => code_cell(Some(qualified.as_str())),
    }
}

fn referential_action(action: &str) -> String {
    escape_cell(&action.replace('_', " "))
}

fn key_rows(snapshot: &CatalogSnapshot, object_id: i32, kind: KeyKind) -> Vec<KeyRow> {
    let mut groups: BTreeMap<&str, Vec<(i32, &str)>> = BTreeMap::new();
    for part in snapshot
        .keys
        .iter()
        .filter(|k| k.object_id == object_id && k.kind == kind)
    {
        groups
            .entry(part.constraint_name.as_str())
            .or_default()
            .push((part.ordinal, part.column.as_str()));
    }

    groups
        .into_iter()
        .map(|(name, mut parts)| {
            parts.sort_unstable();
            KeyRow {
                name: escape_cell(name),
                columns: column_list(parts.into_iter().map(|(_, column)| column)),
            }
        })
        .collect()
}

/// Foreign key parts grouped by constraint, keyed by parent table and
/// constraint name, each group ordered by ordinal.
fn group_foreign_keys<'a>(
    parts: impl Iterator<Item = &'a ForeignKeyPart>,
) -> BTreeMap<(&'a str, &'a str, &'a str), Vec<&'a ForeignKeyPart>> {
    let mut groups: BTreeMap<_, Vec<&ForeignKeyPart>> = BTreeMap::new();
    for part in parts {
        groups
            .entry((
                part.parent_schema.as_str(),
                part.parent_table.as_str(),
                part.constraint_name.as_str(),
            ))
            .or_default()
            .push(part);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|p| p.ordinal);
    }
    groups
}

fn foreign_key_rows(
    snapshot: &CatalogSnapshot,
    paths: &DocumentPaths,
    object_id: i32,
) -> Vec<ForeignKeyRow> {
    let outgoing = snapshot
        .foreign_keys
        .iter()
        .filter(|fk| fk.parent_object_id == object_id);

    group_foreign_keys(outgoing)
        .into_iter()
        .filter_map(|((_, _, name), parts)| {
            let first = parts.first()?;
            let target = format!(
                "{} ({})",
                object_reference(
                    snapshot,
                    paths,
                    first.referenced_object_id,
                    &first.referenced_schema,
                    &first.referenced_table,
                ),
                column_list(parts.iter().map(|p| p.referenced_column.as_str())),
            );
            Some(ForeignKeyRow {
                name: escape_cell(name),
                columns: column_list(parts.iter().map(|p| p.parent_column.as_str())),
                target,
                on_delete: referential_action(&first.on_delete),
                on_update: referential_action(&first.on_update),
            })
        })
        .collect()
}

fn reference_rows(
    snapshot: &CatalogSnapshot,
    paths: &DocumentPaths,
    object_id: i32,
) -> Vec<ReferenceRow> {
    let incoming = snapshot
        .foreign_keys
        .iter()
        .filter(|fk| fk.referenced_object_id == object_id);

    group_foreign_keys(incoming)
        .into_iter()
        .filter_map(|((schema, table, name), parts)| {
            let first = parts.first()?;
            Some(ReferenceRow {
                source: object_reference(snapshot, paths, first.parent_object_id, schema, table),
                name: escape_cell(name),
                columns: column_list(parts.iter().map(|p| p.parent_column.as_str())),
            })
        })
        .collect()
}

fn check_rows(snapshot: &CatalogSnapshot, object_id: i32) -> Vec<CheckRow> {
    let mut checks: Vec<_> = snapshot
        .checks
        .iter()
        .filter(|c| c.object_id == object_id)
        .collect();
    checks.sort_by(|a, b| a.name.cmp(&b.name));

    checks
        .into_iter()
        .map(|check| CheckRow {
            name: escape_cell(&check.name),
            column: check
                .column
                .as_deref()
                .map_or_else(|| "(table)".to_string(), escape_cell),
            expression: code_cell(Some(&check.expression)),
        })
        .collect()
}

fn index_rows(snapshot: &CatalogSnapshot, object_id: i32) -> Vec<IndexRow> {
    let mut groups: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for part in snapshot.indexes.iter().filter(|i| i.object_id == object_id) {
        groups.entry(part.index_name.as_str()).or_default().push(part);
    }

    groups
        .into_iter()
        .filter_map(|(name, mut parts)| {
            parts.sort_by_key(|p| p.ordinal);
            let first = *parts.first()?;

            let keys = parts
                .iter()
                .filter(|p| !p.is_included)
                .map(|p| {
                    let column = escape_cell(&p.column);
                    if p.is_descending {
                        format!("{column} DESC")
                    } else {
                        column
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");

            Some(IndexRow {
                name: escape_cell(name),
                index_type: escape_cell(&first.index_type),
                unique: if first.is_unique { "yes" } else { "no" },
                columns: keys,
                included: column_list(
                    parts
                        .iter()
                        .filter(|p| p.is_included)
                        .map(|p| p.column.as_str()),
                ),
            })
        })
        .collect()
}

fn table_template(
    snapshot: &CatalogSnapshot,
    paths: &DocumentPaths,
    object: &CatalogObject,
) -> TableTemplate {
    let id = object.object_id;
    TableTemplate {
        qualified_name: object.qualified_name(),
        description: description_of(object),
        columns: column_rows(snapshot, id),
        primary_key: key_rows(snapshot, id, KeyKind::PrimaryKey),
        unique_keys: key_rows(snapshot, id, KeyKind::Unique),
        foreign_keys: foreign_key_rows(snapshot, paths, id),
        referenced_by: reference_rows(snapshot, paths, id),
        checks: check_rows(snapshot, id),
        indexes: index_rows(snapshot, id),
    }
}

fn view_template(snapshot: &CatalogSnapshot, object: &CatalogObject) -> ViewTemplate {
    ViewTemplate {
        qualified_name: object.qualified_name(),
        description: description_of(object),
        columns: column_rows(snapshot, object.object_id),
        definition: sql_block(object.definition.as_deref()),
    }
}

fn routine_template(snapshot: &CatalogSnapshot, object: &CatalogObject) -> RoutineTemplate {
    let parameters = snapshot.parameters_of(object.object_id);

    let returns = match object.kind {
        ObjectKind::ScalarFunction => parameters
            .iter()
            .find(|p| p.ordinal == 0)
            .map_or_else(|| NONE.to_string(), |p| format!("`{}`", p.data_type)),
        ObjectKind::InlineTableFunction | ObjectKind::TableFunction => "`table`".to_string(),
        _ => String::new(),
    };

    RoutineTemplate {
        kind_label: object.kind.label(),
        qualified_name: object.qualified_name(),
        description: description_of(object),
        parameters: parameters
            .into_iter()
            .filter(|p| p.ordinal > 0)
            .map(|p| ParameterRow {
                ordinal: p.ordinal,
                name: escape_cell(&p.name),
                data_type: format!("`{}`", escape_cell(&p.data_type.to_string())),
                direction: if p.is_output { "OUT" } else { "IN" },
            })
            .collect(),
        returns,
        definition: sql_block(object.definition.as_deref()),
    }
}
