//! Typed key-column codec configured by `db.primaryKey`
//!
//! `db.primaryKey` lists the key columns as `name:type` pairs, e.g.
//! `dept:string,id:int`. The identifier joins the textual key values with `/`,
//! escaping `\` and `/` inside values so decoding is unambiguous.
//!
//! Timestamp keys are validated on the way out but keep their stored text
//! when the engine returns them as text, because engines like SQLite compare
//! the bound parameter textually. A key is bound back as a typed timestamp
//! only when its text is already the canonical RFC 3339 form.
//!
//! `db.singleDocContentColumns` optionally reorders (or repeats) key columns
//! to match the placeholders of the content query.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::{IdentityCodec, IdentityError, IdentityResult};
use crate::config::ConfigError;
use crate::database::{Row, Value};

const SEPARATOR: char = '/';
const ESCAPE: char = '\\';

/// Offset-less layouts accepted for timestamp keys, read as UTC
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Layouts carrying an explicit offset that RFC 3339 rejects
const OFFSET_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Parse a timestamp key in any of the layouts engines commonly store
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    OFFSET_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|naive| naive.and_utc())
        })
}

/// Declared type of a key column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Int,
    String,
    Timestamp,
}

impl KeyType {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "long" | "integer" => Some(Self::Int),
            "string" | "text" | "" => Some(Self::String),
            "timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Timestamp => "timestamp",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub name: String,
    pub key_type: KeyType,
}

/// Identity codec over one or more typed key columns
#[derive(Debug, Clone)]
pub struct PrimaryKey {
    columns: Vec<KeyColumn>,
    /// Indexes into `columns`, in content-query placeholder order
    bind_order: Vec<usize>,
}

impl PrimaryKey {
    /// Parse `db.primaryKey` and the optional `db.singleDocContentColumns`
    pub fn parse(primary_key: &str, content_columns: &str) -> Result<Self, ConfigError> {
        let mut columns = Vec::new();
        for part in primary_key.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, type_name) = part.split_once(':').unwrap_or((part, ""));
            let name = name.trim();
            let key_type = KeyType::parse(type_name).ok_or_else(|| {
                ConfigError::invalid("db.primaryKey", format!("unknown key type '{type_name}' for column '{name}'"))
            })?;
            if columns.iter().any(|c: &KeyColumn| c.name == name) {
                return Err(ConfigError::invalid(
                    "db.primaryKey",
                    format!("column '{name}' listed twice"),
                ));
            }
            columns.push(KeyColumn {
                name: name.to_string(),
                key_type,
            });
        }
        if columns.is_empty() {
            return Err(ConfigError::invalid("db.primaryKey", "at least one key column is required"));
        }

        let bind_order = if content_columns.trim().is_empty() {
            (0..columns.len()).collect()
        } else {
            content_columns
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|name| {
                    columns.iter().position(|c| c.name == name).ok_or_else(|| {
                        ConfigError::invalid(
                            "db.singleDocContentColumns",
                            format!("'{name}' is not a primary key column"),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self { columns, bind_order })
    }

    #[must_use]
    pub fn columns(&self) -> &[KeyColumn] {
        &self.columns
    }

    fn key_text(column: &KeyColumn, row: &Row) -> IdentityResult<String> {
        let value = match row.get(&column.name) {
            None => return Err(IdentityError::MissingColumn(column.name.clone())),
            Some(Value::Null) => return Err(IdentityError::NullKey(column.name.clone())),
            Some(value) => value,
        };
        match (column.key_type, value) {
            (_, Value::Timestamp(ts)) => Ok(ts.to_rfc3339()),
            (KeyType::Timestamp, other) => {
                let text = other.to_string();
                match parse_timestamp(&text) {
                    Some(_) => Ok(text),
                    None => Err(IdentityError::InvalidKey {
                        column: column.name.clone(),
                        expected: KeyType::Timestamp.to_string(),
                        value: text,
                    }),
                }
            }
            (_, other) => Ok(other.to_string()),
        }
    }

    fn typed(column: &KeyColumn, id: &str, text: String) -> IdentityResult<Value> {
        let malformed = |reason: String| IdentityError::MalformedId {
            id: id.to_string(),
            reason,
        };
        match column.key_type {
            KeyType::String => Ok(Value::Text(text)),
            KeyType::Int => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| malformed(format!("column '{}' is not an int: {e}", column.name))),
            KeyType::Timestamp => match parse_timestamp(&text) {
                Some(ts) if ts.to_rfc3339() == text => Ok(Value::Timestamp(ts)),
                Some(_) => Ok(Value::Text(text)),
                None => Err(malformed(format!("column '{}' is not a timestamp", column.name))),
            },
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}:{}", c.name, c.key_type))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

impl IdentityCodec for PrimaryKey {
    fn encode(&self, row: &Row) -> IdentityResult<String> {
        let mut id = String::new();
        for (idx, column) in self.columns.iter().enumerate() {
            if idx > 0 {
                id.push(SEPARATOR);
            }
            escape_into(&mut id, &Self::key_text(column, row)?);
        }
        Ok(id)
    }

    fn bind_parameters(&self, id: &str) -> IdentityResult<Vec<Value>> {
        let parts = split_escaped(id).ok_or_else(|| IdentityError::MalformedId {
            id: id.to_string(),
            reason: "dangling escape character".to_string(),
        })?;
        if parts.len() != self.columns.len() {
            return Err(IdentityError::MalformedId {
                id: id.to_string(),
                reason: format!("expected {} key part(s), found {}", self.columns.len(), parts.len()),
            });
        }
        self.bind_order
            .iter()
            .map(|&idx| Self::typed(&self.columns[idx], id, parts[idx].clone()))
            .collect()
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        if c == SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

fn split_escaped(id: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = id.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => current.push(chars.next()?),
            SEPARATOR => parts.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    parts.push(current);
    Some(parts)
}
