//! Field registry: the allowlist of client-visible fields.
//!
//! Clients only ever name fields; the SQL text only ever contains the
//! registered `db_column`. A field that is not registered cannot be filtered,
//! sorted or grouped.
//!
//! # Example
//!
//! ```
//! use gridsql::{FieldConfig, FieldRegistry};
//!
//! let registry = FieldRegistry::new()
//!     .field("name", FieldConfig::new("u.name").filterable().sortable())
//!     .field("team", FieldConfig::new("t.name").groupable());
//!
//! assert_eq!(registry.lookup("name").map(FieldConfig::db_column), Some("u.name"));
//! assert!(registry.lookup("password").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;

/// The operation a request wants to perform on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Filter,
    Sort,
    Group,
}

impl Capability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column mapping and permitted operations for one client field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    db_column: String,
    /// Field may appear in `where`.
    pub can_filter: bool,
    /// Field may appear in `order by`.
    pub can_sort: bool,
    /// Field may appear in `group by`.
    pub can_group: bool,
}

impl FieldConfig {
    /// Map a field to `db_column` with every operation denied.
    ///
    /// # Panics
    ///
    /// Panics if `db_column` is empty or only whitespace. Columns come from
    /// server code, so this is a programmer error rather than bad input.
    pub fn new(db_column: impl Into<String>) -> Self {
        let db_column = db_column.into();
        assert!(
            !db_column.trim().is_empty(),
            "FieldConfig db_column must not be empty"
        );
        Self {
            db_column,
            can_filter: false,
            can_sort: false,
            can_group: false,
        }
    }

    /// Map a field to `db_column` with filter, sort and group all permitted.
    pub fn all(db_column: impl Into<String>) -> Self {
        Self::new(db_column).filterable().sortable().groupable()
    }

    #[must_use]
    pub const fn filterable(mut self) -> Self {
        self.can_filter = true;
        self
    }

    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.can_sort = true;
        self
    }

    #[must_use]
    pub const fn groupable(mut self) -> Self {
        self.can_group = true;
        self
    }

    /// The real column (or expression) emitted into SQL.
    pub fn db_column(&self) -> &str {
        &self.db_column
    }

    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Filter => self.can_filter,
            Capability::Sort => self.can_sort,
            Capability::Group => self.can_group,
        }
    }
}

/// Client field name to [`FieldConfig`] mapping.
///
/// Built once per endpoint and shared; lookups never mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: HashMap<String, FieldConfig>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field, replacing any previous entry with the same name.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, config: FieldConfig) -> Self {
        self.insert(name, config);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, config: FieldConfig) -> Option<FieldConfig> {
        self.fields.insert(name.into(), config)
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Registered client field names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<K: Into<String>> FromIterator<(K, FieldConfig)> for FieldRegistry {
    fn from_iter<I: IntoIterator<Item = (K, FieldConfig)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_config_defaults_deny_everything() {
        let config = FieldConfig::new("users.id");
        assert!(!config.allows(Capability::Filter));
        assert!(!config.allows(Capability::Sort));
        assert!(!config.allows(Capability::Group));
        assert_eq!(config.db_column(), "users.id");
    }

    #[test]
    fn test_field_config_builder() {
        let config = FieldConfig::new("users.name").filterable().groupable();
        assert!(config.allows(Capability::Filter));
        assert!(!config.allows(Capability::Sort));
        assert!(config.allows(Capability::Group));

        let all = FieldConfig::all("users.name");
        assert!(all.can_filter && all.can_sort && all.can_group);
    }

    #[test]
    #[should_panic(expected = "db_column must not be empty")]
    fn test_empty_column_panics() {
        let _ = FieldConfig::new("  ");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = FieldRegistry::new()
            .field("name", FieldConfig::new("u.name").filterable())
            .field("id", FieldConfig::all("u.id"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("name").unwrap().db_column(), "u.name");
        assert!(registry.lookup("Name").is_none());
        assert!(registry.lookup("missing").is_none());
        assert_eq!(registry.names(), vec!["id", "name"]);
    }

    #[test]
    fn test_registry_from_iter_and_replace() {
        let mut registry: FieldRegistry = [("a", FieldConfig::new("t.a"))].into_iter().collect();
        let old = registry.insert("a", FieldConfig::new("t.a2"));
        assert_eq!(old.unwrap().db_column(), "t.a");
        assert_eq!(registry.lookup("a").unwrap().db_column(), "t.a2");
    }
}
