//! Typed field extraction from tiberius rows.

use crate::{Result, error::DbScribeError};
use tiberius::Row;

/// A NOT NULL catalog field came back NULL.
#[derive(Debug, thiserror::Error)]
#[error("unexpected NULL value")]
struct UnexpectedNull;

/// Extension trait for reading catalog fields with the query name in errors.
///
/// # Example
/// ```rust,ignore
/// let name = row.text("column_name", "columns")?;
/// let default = row.opt_text("default_definition", "columns")?;
/// ```
pub(crate) trait RowExt {
    /// Nullable text field
    fn opt_text(&self, field: &str, query: &str) -> Result<Option<String>>;

    /// Non-null text field
    fn text(&self, field: &str, query: &str) -> Result<String> {
        self.opt_text(field, query)?
            .ok_or_else(|| DbScribeError::parse_field(field, query, UnexpectedNull))
    }

    /// Non-null `int` field
    fn int(&self, field: &str, query: &str) -> Result<i32>;

    /// Non-null `bit` field
    fn flag(&self, field: &str, query: &str) -> Result<bool>;
}

impl RowExt for Row {
    fn opt_text(&self, field: &str, query: &str) -> Result<Option<String>> {
        self.try_get::<&str, _>(field)
            .map(|value| value.map(str::to_string))
            .map_err(|e| DbScribeError::parse_field(field, query, e))
    }

    fn int(&self, field: &str, query: &str) -> Result<i32> {
        self.try_get::<i32, _>(field)
            .map_err(|e| DbScribeError::parse_field(field, query, e))?
            .ok_or_else(|| DbScribeError::parse_field(field, query, UnexpectedNull))
    }

    fn flag(&self, field: &str, query: &str) -> Result<bool> {
        self.try_get::<bool, _>(field)
            .map_err(|e| DbScribeError::parse_field(field, query, e))?
            .ok_or_else(|| DbScribeError::parse_field(field, query, UnexpectedNull))
    }
}
