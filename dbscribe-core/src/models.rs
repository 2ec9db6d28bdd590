//! Catalog snapshot model.
//!
//! Every struct here is a flat, read-only copy of one catalog row. Rows are
//! stored in the order the reader received them; grouping and ordering by
//! schema, name and ordinal happen in the renderers.

use serde::{Deserialize, Serialize};

/// Kind of a documented catalog object, keyed by the `sys.objects.type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// User table (`U`)
    Table,
    /// View (`V`)
    View,
    /// SQL stored procedure (`P`)
    Procedure,
    /// Scalar function (`FN`)
    ScalarFunction,
    /// Inline table-valued function (`IF`)
    InlineTableFunction,
    /// Multi-statement table-valued function (`TF`)
    TableFunction,
}

impl ObjectKind {
    /// Parses a `sys.objects.type` code. Trailing blanks are ignored.
    pub fn from_type_code(code: &str) -> Option<Self> {
        match code.trim() {
            "U" => Some(Self::Table),
            "V" => Some(Self::View),
            "P" => Some(Self::Procedure),
            "FN" => Some(Self::ScalarFunction),
            "IF" => Some(Self::InlineTableFunction),
            "TF" => Some(Self::TableFunction),
            _ => None,
        }
    }

    /// True for procedures and functions.
    pub fn is_routine(self) -> bool {
        !matches!(self, Self::Table | Self::View)
    }

    /// Human-readable label used in headings and the summary.
    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::View => "View",
            Self::Procedure => "Stored procedure",
            Self::ScalarFunction => "Scalar function",
            Self::InlineTableFunction => "Inline table-valued function",
            Self::TableFunction => "Table-valued function",
        }
    }

    /// Output sub-folder for documents of this kind.
    pub fn folder(self) -> &'static str {
        match self {
            Self::Table => "tables",
            Self::View => "views",
            _ => "routines",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw type tuple as reported by `sys.columns` / `sys.parameters`.
///
/// `max_length` is in bytes and is `-1` for `(max)` types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub max_length: i32,
    pub precision: i32,
    pub scale: i32,
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::type_render::render_type(self))
    }
}

/// Table, view or routine reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogObject {
    pub object_id: i32,
    pub schema: String,
    pub name: String,
    pub kind: ObjectKind,
    /// Module text for views and routines; `None` for tables and encrypted modules
    pub definition: Option<String>,
    /// `MS_Description` extended property
    pub description: Option<String>,
}

impl CatalogObject {
    /// `schema.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Column of a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub object_id: i32,
    pub ordinal: i32,
    pub name: String,
    pub data_type: TypeDescriptor,
    pub is_nullable: bool,
    pub is_identity: bool,
    pub default_expression: Option<String>,
    pub computed_expression: Option<String>,
    pub description: Option<String>,
}

/// Kind of key constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyKind {
    /// `PK`
    PrimaryKey,
    /// `UQ`
    Unique,
}

impl KeyKind {
    /// Parses a `sys.key_constraints.type` code.
    pub fn from_type_code(code: &str) -> Option<Self> {
        match code.trim() {
            "PK" => Some(Self::PrimaryKey),
            "UQ" => Some(Self::Unique),
            _ => None,
        }
    }
}

/// One column of a primary key or unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPart {
    pub object_id: i32,
    pub constraint_name: String,
    pub kind: KeyKind,
    pub ordinal: i32,
    pub column: String,
}

/// One column pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyPart {
    pub constraint_name: String,
    pub ordinal: i32,
    pub parent_object_id: i32,
    pub parent_schema: String,
    pub parent_table: String,
    pub parent_column: String,
    pub referenced_object_id: i32,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
    /// e.g. `NO_ACTION`, `CASCADE`
    pub on_delete: String,
    pub on_update: String,
}

/// Check constraint; `column` is `None` for table-level checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConstraint {
    pub object_id: i32,
    pub name: String,
    pub column: Option<String>,
    pub expression: String,
}

/// Routine parameter. Ordinal 0 is the return value of a scalar function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub object_id: i32,
    pub ordinal: i32,
    pub name: String,
    pub data_type: TypeDescriptor,
    pub is_output: bool,
}

/// One column of a non-constraint index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPart {
    pub object_id: i32,
    pub index_name: String,
    /// `CLUSTERED`, `NONCLUSTERED`, ...
    pub index_type: String,
    pub is_unique: bool,
    pub ordinal: i32,
    pub column: String,
    pub is_descending: bool,
    pub is_included: bool,
}

/// Database-level facts shown in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub product_version: Option<String>,
}

impl DatabaseInfo {
    /// Creates database info without a version
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            product_version: None,
        }
    }
}

/// Everything read from the catalog in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub database: DatabaseInfo,
    pub objects: Vec<CatalogObject>,
    pub columns: Vec<Column>,
    pub keys: Vec<KeyPart>,
    pub foreign_keys: Vec<ForeignKeyPart>,
    pub checks: Vec<CheckConstraint>,
    pub parameters: Vec<Parameter>,
    pub indexes: Vec<IndexPart>,
}

impl CatalogSnapshot {
    /// Creates an empty snapshot for the named database
    pub fn new(database: DatabaseInfo) -> Self {
        Self {
            database,
            objects: Vec::new(),
            columns: Vec::new(),
            keys: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            parameters: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Number of objects of the given kind
    pub fn count(&self, predicate: impl Fn(ObjectKind) -> bool) -> usize {
        self.objects.iter().filter(|o| predicate(o.kind)).count()
    }

    /// Looks up an object by id
    pub fn object(&self, object_id: i32) -> Option<&CatalogObject> {
        self.objects.iter().find(|o| o.object_id == object_id)
    }

    /// Columns of one object, ordered by ordinal
    pub fn columns_of(&self, object_id: i32) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| c.object_id == object_id)
            .collect();
        columns.sort_by_key(|c| c.ordinal);
        columns
    }

    /// Parameters of one routine, ordered by ordinal
    pub fn parameters_of(&self, object_id: i32) -> Vec<&Parameter> {
        let mut parameters: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|p| p.object_id == object_id)
            .collect();
        parameters.sort_by_key(|p| p.ordinal);
        parameters
    }

    /// Keeps only objects whose schema passes `keep`; rows that hang off a
    /// dropped object go with it. Incoming foreign keys from dropped schemas
    /// are dropped as well.
    pub fn retain_schemas(&mut self, keep: impl Fn(&str) -> bool) {
        self.objects.retain(|o| keep(&o.schema));
        let ids: std::collections::HashSet<i32> =
            self.objects.iter().map(|o| o.object_id).collect();

        self.columns.retain(|c| ids.contains(&c.object_id));
        self.keys.retain(|k| ids.contains(&k.object_id));
        self.checks.retain(|c| ids.contains(&c.object_id));
        self.parameters.retain(|p| ids.contains(&p.object_id));
        self.indexes.retain(|i| ids.contains(&i.object_id));
        self.foreign_keys.retain(|fk| keep(&fk.parent_schema));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: i32, schema: &str, name: &str, kind: ObjectKind) -> CatalogObject {
        CatalogObject {
            object_id: id,
            schema: schema.to_string(),
            name: name.to_string(),
            kind,
            definition: None,
            description: None,
        }
    }

    fn column(object_id: i32, ordinal: i32, name: &str) -> Column {
        Column {
            object_id,
            ordinal,
            name: name.to_string(),
            data_type: TypeDescriptor {
                name: "int".to_string(),
                max_length: 4,
                precision: 10,
                scale: 0,
            },
            is_nullable: false,
            is_identity: false,
            default_expression: None,
            computed_expression: None,
            description: None,
        }
    }

    #[test]
    fn test_object_kind_from_type_code() {
        assert_eq!(ObjectKind::from_type_code("U "), Some(ObjectKind::Table));
        assert_eq!(ObjectKind::from_type_code("V"), Some(ObjectKind::View));
        assert_eq!(ObjectKind::from_type_code("P "), Some(ObjectKind::Procedure));
        assert_eq!(
            ObjectKind::from_type_code("FN"),
            Some(ObjectKind::ScalarFunction)
        );
        assert_eq!(
            ObjectKind::from_type_code("IF"),
            Some(ObjectKind::InlineTableFunction)
        );
        assert_eq!(
            ObjectKind::from_type_code("TF"),
            Some(ObjectKind::TableFunction)
        );
        assert_eq!(ObjectKind::from_type_code("TR"), None);
    }

    #[test]
    fn test_object_kind_folders() {
        assert_eq!(ObjectKind::Table.folder(), "tables");
        assert_eq!(ObjectKind::View.folder(), "views");
        assert_eq!(ObjectKind::Procedure.folder(), "routines");
        assert_eq!(ObjectKind::TableFunction.folder(), "routines");
        assert!(ObjectKind::ScalarFunction.is_routine());
        assert!(!ObjectKind::View.is_routine());
    }

    #[test]
    fn test_key_kind_from_type_code() {
        assert_eq!(KeyKind::from_type_code("PK"), Some(KeyKind::PrimaryKey));
        assert_eq!(KeyKind::from_type_code("UQ"), Some(KeyKind::Unique));
        assert_eq!(KeyKind::from_type_code("F "), None);
    }

    #[test]
    fn test_columns_of_sorted_by_ordinal() {
        let mut snapshot = CatalogSnapshot::new(DatabaseInfo::new("Sales"));
        snapshot.objects.push(object(1, "dbo", "Orders", ObjectKind::Table));
        snapshot.columns.push(column(1, 3, "Total"));
        snapshot.columns.push(column(1, 1, "OrderId"));
        snapshot.columns.push(column(2, 1, "Other"));
        snapshot.columns.push(column(1, 2, "CustomerId"));

        let names: Vec<&str> = snapshot
            .columns_of(1)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["OrderId", "CustomerId", "Total"]);
    }

    #[test]
    fn test_retain_schemas_drops_dependent_rows() {
        let mut snapshot = CatalogSnapshot::new(DatabaseInfo::new("Sales"));
        snapshot.objects.push(object(1, "dbo", "Orders", ObjectKind::Table));
        snapshot.objects.push(object(2, "audit", "Log", ObjectKind::Table));
        snapshot.columns.push(column(1, 1, "OrderId"));
        snapshot.columns.push(column(2, 1, "LogId"));

        snapshot.retain_schemas(|schema| schema != "audit");

        assert_eq!(snapshot.objects.len(), 1);
        assert_eq!(snapshot.columns.len(), 1);
        assert_eq!(snapshot.columns[0].name, "OrderId");
        assert_eq!(snapshot.count(|k| k == ObjectKind::Table), 1);
    }
}
