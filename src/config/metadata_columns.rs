//! `db.metadataColumns`: which content columns become document metadata
//!
//! Format is a comma separated list of `column` or `column:metadataName`.

use std::fmt;

use super::errors::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataColumns {
    /// `(column name, metadata name)` in configuration order
    mapping: Vec<(String, String)>,
}

impl MetadataColumns {
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let mut mapping: Vec<(String, String)> = Vec::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (column, key) = match entry.split_once(':') {
                Some((column, key)) => (column.trim(), key.trim()),
                None => (entry, entry),
            };
            if column.is_empty() || key.is_empty() {
                return Err(ConfigError::invalid(
                    "db.metadataColumns",
                    format!("malformed entry '{entry}'"),
                ));
            }
            if mapping.iter().any(|(c, _)| c == column) {
                return Err(ConfigError::invalid(
                    "db.metadataColumns",
                    format!("column '{column}' mapped twice"),
                ));
            }
            mapping.push((column.to_string(), key.to_string()));
        }
        Ok(Self { mapping })
    }

    #[must_use]
    pub fn is_metadata_column(&self, column: &str) -> bool {
        self.metadata_name(column).is_some()
    }

    /// Metadata key for a column, if the column is mapped
    #[must_use]
    pub fn metadata_name(&self, column: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, key)| key.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl fmt::Display for MetadataColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .mapping
            .iter()
            .map(|(column, key)| format!("{column}:{key}"))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
