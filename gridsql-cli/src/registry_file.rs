//! Field registry files.
//!
//! ```toml
//! take_limit = 100
//!
//! [fields.name]
//! column = "u.name"
//! filter = true
//! sort = true
//!
//! [fields.team]
//! column = "t.name"
//! filter = true
//! group = true
//! ```
//!
//! `column` defaults to the field name. Capabilities default to off.

use anyhow::{Context, Result, bail};
use gridsql::{FieldConfig, FieldRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryFile {
    /// Page size ceiling; omitted means no paging.
    #[serde(default)]
    pub take_limit: Option<u64>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub filter: bool,
    #[serde(default)]
    pub sort: bool,
    #[serde(default)]
    pub group: bool,
}

impl RegistryFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid registry file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: Self = toml::from_str(text)?;
        if file.fields.is_empty() {
            bail!("no fields defined");
        }
        for (name, entry) in &file.fields {
            if name.trim().is_empty() {
                bail!("field names must not be empty");
            }
            if entry.column.as_deref().is_some_and(|c| c.trim().is_empty()) {
                bail!("field '{name}' has an empty column");
            }
        }
        Ok(file)
    }

    pub fn registry(&self) -> FieldRegistry {
        self.fields
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.config(name)))
            .collect()
    }
}

impl FieldEntry {
    fn config(&self, name: &str) -> FieldConfig {
        let mut config = FieldConfig::new(self.column.as_deref().unwrap_or(name));
        if self.filter {
            config = config.filterable();
        }
        if self.sort {
            config = config.sortable();
        }
        if self.group {
            config = config.groupable();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsql::Capability;

    #[test]
    fn test_parse_registry() {
        let file = RegistryFile::parse(
            r#"
            take_limit = 50

            [fields.name]
            column = "u.name"
            filter = true
            sort = true

            [fields.age]
            filter = true
            "#,
        )
        .unwrap();

        assert_eq!(file.take_limit, Some(50));
        let registry = file.registry();
        let name = registry.lookup("name").unwrap();
        assert_eq!(name.db_column(), "u.name");
        assert!(name.allows(Capability::Sort));
        assert!(!name.allows(Capability::Group));

        let age = registry.lookup("age").unwrap();
        assert_eq!(age.db_column(), "age");
        assert!(!age.allows(Capability::Sort));
    }

    #[test]
    fn test_rejects_bad_files() {
        assert!(RegistryFile::parse("").is_err());
        assert!(RegistryFile::parse("[fields.a]\ncolumn = \"\"").is_err());
        assert!(RegistryFile::parse("[fields.a]\nfilterable = true").is_err());
    }
}
