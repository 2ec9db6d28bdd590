//! Schema include/exclude filter.

use serde::{Deserialize, Serialize};

/// Restricts which schemas are documented.
///
/// An empty `include` list means every schema. `exclude` is applied after
/// `include`. Matching is case-insensitive, like SQL Server's default
/// collation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaFilter {
    /// Schemas to document; empty means all
    pub include: Vec<String>,
    /// Schemas to skip
    pub exclude: Vec<String>,
}

impl SchemaFilter {
    /// Returns true when objects in `schema` should be documented.
    pub fn allows(&self, schema: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|s| s.eq_ignore_ascii_case(schema));
        included && !self.exclude.iter().any(|s| s.eq_ignore_ascii_case(schema))
    }

    /// True when the filter lets everything through.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = SchemaFilter::default();
        assert!(filter.is_empty());
        assert!(filter.allows("dbo"));
        assert!(filter.allows("sales"));
    }

    #[test]
    fn test_include_list() {
        let filter = SchemaFilter {
            include: vec!["dbo".to_string()],
            exclude: Vec::new(),
        };
        assert!(filter.allows("dbo"));
        assert!(filter.allows("DBO"));
        assert!(!filter.allows("sales"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = SchemaFilter {
            include: vec!["dbo".to_string(), "audit".to_string()],
            exclude: vec!["Audit".to_string()],
        };
        assert!(filter.allows("dbo"));
        assert!(!filter.allows("audit"));
    }
}
