//! Fixed catalog queries.
//!
//! Every numeric catalog value is cast to `int` and every flag to `bit`, and
//! `sql_variant` values (extended properties, server properties) are cast to
//! `nvarchar`, so the row decoder only deals with `i32`, `bool` and `&str`.
//! None of the queries sort: ordering is applied when rendering.

/// Current database name and product version.
pub const DATABASE_INFO: &str = r#"
SELECT
    DB_NAME() AS database_name,
    CAST(SERVERPROPERTY('ProductVersion') AS nvarchar(128)) AS product_version
"#;

/// Tables, views and routines with their module text and description.
pub const OBJECTS: &str = r#"
SELECT
    CAST(o.object_id AS int) AS object_id,
    s.name AS schema_name,
    o.name AS object_name,
    CAST(RTRIM(o.type) AS nvarchar(2)) AS object_type,
    m.definition AS definition,
    CAST(ep.value AS nvarchar(4000)) AS description
FROM sys.objects AS o
JOIN sys.schemas AS s ON s.schema_id = o.schema_id
LEFT JOIN sys.sql_modules AS m ON m.object_id = o.object_id
LEFT JOIN sys.extended_properties AS ep
    ON ep.class = 1 AND ep.major_id = o.object_id AND ep.minor_id = 0
    AND ep.name = N'MS_Description'
WHERE o.is_ms_shipped = 0
  AND o.type IN ('U', 'V', 'P', 'FN', 'IF', 'TF')
"#;

/// Columns of tables and views.
pub const COLUMNS: &str = r#"
SELECT
    CAST(c.object_id AS int) AS object_id,
    CAST(c.column_id AS int) AS ordinal,
    c.name AS column_name,
    t.name AS type_name,
    CAST(c.max_length AS int) AS max_length,
    CAST(c.precision AS int) AS precision,
    CAST(c.scale AS int) AS scale,
    CAST(ISNULL(c.is_nullable, 1) AS bit) AS is_nullable,
    CAST(c.is_identity AS bit) AS is_identity,
    dc.definition AS default_definition,
    cc.definition AS computed_definition,
    CAST(ep.value AS nvarchar(4000)) AS description
FROM sys.columns AS c
JOIN sys.objects AS o ON o.object_id = c.object_id
JOIN sys.types AS t ON t.user_type_id = c.user_type_id
LEFT JOIN sys.default_constraints AS dc ON dc.object_id = c.default_object_id
LEFT JOIN sys.computed_columns AS cc
    ON cc.object_id = c.object_id AND cc.column_id = c.column_id
LEFT JOIN sys.extended_properties AS ep
    ON ep.class = 1 AND ep.major_id = c.object_id AND ep.minor_id = c.column_id
    AND ep.name = N'MS_Description'
WHERE o.is_ms_shipped = 0
  AND o.type IN ('U', 'V')
"#;

/// Primary key and unique constraint columns.
pub const KEYS: &str = r#"
SELECT
    CAST(kc.parent_object_id AS int) AS object_id,
    kc.name AS constraint_name,
    CAST(RTRIM(kc.type) AS nvarchar(2)) AS constraint_type,
    CAST(ic.key_ordinal AS int) AS ordinal,
    c.name AS column_name
FROM sys.key_constraints AS kc
JOIN sys.objects AS o ON o.object_id = kc.parent_object_id
JOIN sys.index_columns AS ic
    ON ic.object_id = kc.parent_object_id AND ic.index_id = kc.unique_index_id
JOIN sys.columns AS c
    ON c.object_id = ic.object_id AND c.column_id = ic.column_id
WHERE o.is_ms_shipped = 0
"#;

/// Foreign key column pairs with both ends resolved to schema, table and column.
pub const FOREIGN_KEYS: &str = r#"
SELECT
    fk.name AS constraint_name,
    CAST(fkc.constraint_column_id AS int) AS ordinal,
    CAST(fk.parent_object_id AS int) AS parent_object_id,
    ps.name AS parent_schema,
    po.name AS parent_table,
    pc.name AS parent_column,
    CAST(fk.referenced_object_id AS int) AS referenced_object_id,
    rs.name AS referenced_schema,
    ro.name AS referenced_table,
    rc.name AS referenced_column,
    fk.delete_referential_action_desc AS on_delete,
    fk.update_referential_action_desc AS on_update
FROM sys.foreign_keys AS fk
JOIN sys.foreign_key_columns AS fkc ON fkc.constraint_object_id = fk.object_id
JOIN sys.objects AS po ON po.object_id = fk.parent_object_id
JOIN sys.schemas AS ps ON ps.schema_id = po.schema_id
JOIN sys.columns AS pc
    ON pc.object_id = fkc.parent_object_id AND pc.column_id = fkc.parent_column_id
JOIN sys.objects AS ro ON ro.object_id = fk.referenced_object_id
JOIN sys.schemas AS rs ON rs.schema_id = ro.schema_id
JOIN sys.columns AS rc
    ON rc.object_id = fkc.referenced_object_id AND rc.column_id = fkc.referenced_column_id
WHERE po.is_ms_shipped = 0
"#;

/// Check constraints; `column_name` is NULL for table-level checks.
pub const CHECK_CONSTRAINTS: &str = r#"
SELECT
    CAST(cc.parent_object_id AS int) AS object_id,
    cc.name AS constraint_name,
    c.name AS column_name,
    cc.definition AS definition
FROM sys.check_constraints AS cc
JOIN sys.objects AS o ON o.object_id = cc.parent_object_id
LEFT JOIN sys.columns AS c
    ON c.object_id = cc.parent_object_id AND c.column_id = cc.parent_column_id
WHERE o.is_ms_shipped = 0
"#;

/// Routine parameters; `parameter_id` 0 is a scalar function's return value.
pub const PARAMETERS: &str = r#"
SELECT
    CAST(p.object_id AS int) AS object_id,
    CAST(p.parameter_id AS int) AS ordinal,
    p.name AS parameter_name,
    t.name AS type_name,
    CAST(p.max_length AS int) AS max_length,
    CAST(p.precision AS int) AS precision,
    CAST(p.scale AS int) AS scale,
    CAST(p.is_output AS bit) AS is_output
FROM sys.parameters AS p
JOIN sys.objects AS o ON o.object_id = p.object_id
JOIN sys.types AS t ON t.user_type_id = p.user_type_id
WHERE o.is_ms_shipped = 0
  AND o.type IN ('P', 'FN', 'IF', 'TF')
"#;

/// Index columns of table indexes that do not back a key constraint.
pub const INDEXES: &str = r#"
SELECT
    CAST(i.object_id AS int) AS object_id,
    i.name AS index_name,
    i.type_desc AS index_type,
    CAST(i.is_unique AS bit) AS is_unique,
    CAST(ic.index_column_id AS int) AS ordinal,
    c.name AS column_name,
    CAST(ic.is_descending_key AS bit) AS is_descending,
    CAST(ic.is_included_column AS bit) AS is_included
FROM sys.indexes AS i
JOIN sys.objects AS o ON o.object_id = i.object_id
JOIN sys.index_columns AS ic
    ON ic.object_id = i.object_id AND ic.index_id = i.index_id
JOIN sys.columns AS c
    ON c.object_id = ic.object_id AND c.column_id = ic.column_id
WHERE o.is_ms_shipped = 0
  AND o.type = 'U'
  AND i.type > 0
  AND i.is_primary_key = 0
  AND i.is_unique_constraint = 0
  AND i.is_hypothetical = 0
"#;

/// Every query in the order the reader runs them, with the name used in
/// logs and errors.
pub const ALL: [(&str, &str); 8] = [
    ("database info", DATABASE_INFO),
    ("objects", OBJECTS),
    ("columns", COLUMNS),
    ("keys", KEYS),
    ("foreign keys", FOREIGN_KEYS),
    ("check constraints", CHECK_CONSTRAINTS),
    ("parameters", PARAMETERS),
    ("indexes", INDEXES),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_are_read_only() {
        for (name, sql) in ALL {
            let upper = sql.to_uppercase();
            assert!(upper.trim_start().starts_with("SELECT"), "{name}");
            for keyword in ["INSERT ", "UPDATE ", "DELETE ", "EXEC", "DROP ", "ALTER "] {
                assert!(!upper.contains(keyword), "{name} contains {keyword}");
            }
        }
    }

    #[test]
    fn test_queries_do_not_sort() {
        for (name, sql) in ALL {
            assert!(!sql.to_uppercase().contains("ORDER BY"), "{name}");
        }
    }

    #[test]
    fn test_object_queries_exclude_shipped_objects() {
        for (name, sql) in &ALL[1..] {
            assert!(sql.contains("is_ms_shipped = 0"), "{name}");
        }
    }
}
