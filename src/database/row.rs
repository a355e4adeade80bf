//! A positioned result row: ordered column names plus typed values

use std::sync::Arc;

use super::value::Value;

/// One row of a result set.
///
/// Column names are shared between rows of the same result set, so cloning a
/// row never copies the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from shared column names and the matching values.
    ///
    /// Extra values past the last column are dropped; missing trailing values
    /// read as NULL.
    #[must_use]
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Null);
        Self { columns, values }
    }

    /// Convenience constructor for ad-hoc rows
    #[must_use]
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self::new(columns.into(), values)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Value of the first column with this exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| &self.values[idx])
    }

    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column name, value)` in result-set order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_index() {
        let row = Row::from_pairs([
            ("id", Value::Int(7)),
            ("name", Value::Text("seven".into())),
        ]);

        assert_eq!(row.get("name"), Some(&Value::Text("seven".into())));
        assert_eq!(row.value_at(0), Some(&Value::Int(7)));
        assert!(row.get("missing").is_none());
        assert!(row.has_column("id"));
        assert_eq!(row.column_names(), ["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn short_value_lists_are_padded_with_null() {
        let columns: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
        let row = Row::new(columns, vec![Value::Int(1)]);
        assert_eq!(row.get("b"), Some(&Value::Null));
    }
}
