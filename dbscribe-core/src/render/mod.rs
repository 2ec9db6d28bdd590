//! Markdown rendering of a catalog snapshot.
//!
//! [`report`] builds one document per table, view or routine and [`summary`]
//! builds the `index.md` that links them. Both sort everything they print,
//! so the same snapshot always renders to the same bytes.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::{
    Result,
    models::{CatalogObject, CatalogSnapshot},
};

pub mod report;
pub mod summary;

pub use report::build_report;
pub use summary::build_summary;

/// File name of the summary document.
pub const INDEX_FILE: &str = "index.md";

/// Placeholder for a section with no rows.
pub(crate) const NONE: &str = "_None._";

/// A rendered markdown file, relative to the output folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path below the output folder, e.g. `tables/dbo.Orders.md`
    pub relative_path: PathBuf,
    /// Markdown text, always ending in a single newline
    pub content: String,
}

impl Document {
    pub(crate) fn new(relative_path: PathBuf, content: &str) -> Self {
        let mut content = content.trim_end().to_string();
        content.push('\n');
        Self {
            relative_path,
            content,
        }
    }
}

/// Renders the summary and every object document.
///
/// The summary comes first, followed by the objects in schema and name order.
///
/// # Errors
/// Returns [`crate::error::DbScribeError::Render`] if a template fails
pub fn render_all(snapshot: &CatalogSnapshot) -> Result<Vec<Document>> {
    let paths = DocumentPaths::new(snapshot);
    let mut documents = Vec::with_capacity(snapshot.objects.len() + 1);
    documents.push(build_summary(snapshot, &paths)?);

    for object in sorted_objects(snapshot) {
        documents.push(build_report(snapshot, &paths, object)?);
    }

    tracing::debug!("Rendered {} documents", documents.len());
    Ok(documents)
}

/// Objects ordered by schema, then name.
pub(crate) fn sorted_objects(snapshot: &CatalogSnapshot) -> Vec<&CatalogObject> {
    let mut objects: Vec<&CatalogObject> = snapshot.objects.iter().collect();
    objects.sort_by(|a, b| {
        (&a.schema, &a.name, a.object_id).cmp(&(&b.schema, &b.name, b.object_id))
    });
    objects
}

/// File stem for an object: `schema.name` with characters that are not
/// allowed in file names replaced by `_`.
///
/// ```rust
/// use dbscribe_core::models::{CatalogObject, ObjectKind};
/// use dbscribe_core::render::file_stem;
///
/// let object = CatalogObject {
///     object_id: 1,
///     schema: "dbo".to_string(),
///     name: "Orders/Archive".to_string(),
///     kind: ObjectKind::Table,
///     definition: None,
///     description: None,
/// };
/// assert_eq!(file_stem(&object), "dbo.Orders_Archive");
/// ```
pub fn file_stem(object: &CatalogObject) -> String {
    object
        .qualified_name()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// File names of every object's document, unique per kind folder.
///
/// Objects are named by [`file_stem`]. When two objects in the same folder
/// end up with the same name, compared case-insensitively, the one sorting
/// later gets `~<object_id>` appended so no document overwrites another.
#[derive(Debug, Clone, Default)]
pub struct DocumentPaths {
    stems: HashMap<i32, String>,
}

impl DocumentPaths {
    /// Assigns a file name to every object in `snapshot`.
    pub fn new(snapshot: &CatalogSnapshot) -> Self {
        let mut taken: HashSet<(&'static str, String)> = HashSet::new();
        let mut stems = HashMap::with_capacity(snapshot.objects.len());

        for object in sorted_objects(snapshot) {
            let folder = object.kind.folder();
            let base = file_stem(object);
            let mut stem = base.clone();
            let mut attempt = 1;

            while !taken.insert((folder, stem.to_lowercase())) {
                stem = if attempt == 1 {
                    format!("{base}~{}", object.object_id)
                } else {
                    format!("{base}~{}~{attempt}", object.object_id)
                };
                attempt += 1;
            }

            if stem != base {
                tracing::warn!(
                    "{} shares the file name {}.md with another object, writing {}.md",
                    object.qualified_name(),
                    base,
                    stem
                );
            }
            stems.insert(object.object_id, stem);
        }

        Self { stems }
    }

    fn stem(&self, object: &CatalogObject) -> String {
        self.stems
            .get(&object.object_id)
            .cloned()
            .unwrap_or_else(|| file_stem(object))
    }

    /// Path of an object's document below the output folder.
    pub fn path(&self, object: &CatalogObject) -> PathBuf {
        PathBuf::from(object.kind.folder()).join(format!("{}.md", self.stem(object)))
    }

    /// Link target for an object's document, relative to the output folder.
    pub fn link(&self, object: &CatalogObject) -> String {
        format!(
            "{}/{}",
            object.kind.folder(),
            encode_link_segment(&format!("{}.md", self.stem(object)))
        )
    }
}

/// Percent-encodes one path segment of a markdown link target.
///
/// Parentheses are encoded as well since an unbalanced one ends the link.
fn encode_link_segment(segment: &str) -> String {
    let Ok(mut url) = url::Url::parse("file:///") else {
        return segment.replace(' ', "%20");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path()
        .trim_start_matches('/')
        .replace('(', "%28")
        .replace(')', "%29")
}

/// Text for the label of a markdown link: escaped like a table cell, with
/// brackets escaped so they cannot close the label.
pub(crate) fn link_label(text: &str) -> String {
    escape_cell(&text.replace('\\', "\\\\"))
        .replace('[', "\\[")
        .replace(']', "\\]")
}

/// Makes text safe for a single markdown table cell: line breaks become
/// spaces and `|` is escaped.
pub fn escape_cell(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Table cell holding an SQL fragment, as inline code when possible.
pub(crate) fn code_cell(text: Option<&str>) -> String {
    match text.map(escape_cell) {
        None => String::new(),
        Some(text) if text.is_empty() => String::new(),
        Some(text) if text.contains('`') => text,
        Some(text) => format!("`{text}`"),
    }
}

/// Fenced `sql` block for a module definition.
pub(crate) fn sql_block(definition: Option<&str>) -> String {
    let Some(definition) = definition.map(str::trim).filter(|d| !d.is_empty()) else {
        return "_Definition unavailable._".to_string();
    };

    // The fence must be longer than any backtick run inside the body
    let longest_run = definition
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);

    format!("{fence}sql\n{definition}\n{fence}")
}
