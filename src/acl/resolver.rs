//! Runs the ACL query for one document and folds its rows into an [`Acl`]

use futures::TryStreamExt;

use super::{Acl, AclColumn, AclEmptyPolicy};
use crate::database::{Connection, DbResult, Row, Value};

/// Outcome of one ACL lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclLookup {
    /// At least one row was returned
    Found(Acl),
    /// The query returned zero rows
    NoRows,
}

impl AclLookup {
    /// ACL to attach to the document under `policy`; `None` means no ACL
    #[must_use]
    pub fn into_acl(self, policy: AclEmptyPolicy) -> Option<Acl> {
        match (self, policy) {
            (Self::Found(acl), _) => Some(acl),
            (Self::NoRows, AclEmptyPolicy::Public) => None,
            (Self::NoRows, AclEmptyPolicy::Restricted) => Some(Acl::restricted()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AclResolver {
    sql: String,
    delimiter: String,
}

impl AclResolver {
    pub fn new(sql: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            delimiter: delimiter.into(),
        }
    }

    /// Run the ACL query with the document's bind parameters
    pub async fn resolve<C: Connection>(&self, conn: &mut C, params: &[Value]) -> DbResult<AclLookup> {
        let mut rows = conn.execute_parameterized(&self.sql, params);
        let mut acl = Acl::default();
        let mut row_count = 0usize;

        while let Some(row) = rows.try_next().await? {
            self.accumulate(&mut acl, &row);
            row_count += 1;
        }

        if row_count == 0 {
            log::debug!("acl query returned no rows");
            return Ok(AclLookup::NoRows);
        }
        log::trace!("acl built from {row_count} row(s)");
        Ok(AclLookup::Found(acl))
    }

    /// Union the principals of one row into `acl`.
    ///
    /// Columns missing from the row, NULL values and blank tokens contribute
    /// nothing.
    pub fn accumulate(&self, acl: &mut Acl, row: &Row) {
        for column in AclColumn::ALL {
            let Some(text) = row.get(column.column_name()).and_then(Value::to_text) else {
                continue;
            };
            for name in self.split_principals(&text) {
                acl.insert(column, name);
            }
        }
    }

    /// Split a principal column value; an empty delimiter keeps it whole
    pub fn split_principals<'v>(&self, value: &'v str) -> Vec<&'v str> {
        let tokens: Vec<&str> = if self.delimiter.is_empty() {
            vec![value]
        } else {
            value.split(self.delimiter.as_str()).collect()
        };
        tokens
            .into_iter()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::Principal;

    fn users(names: &[&str]) -> std::collections::BTreeSet<Principal> {
        names.iter().map(|n| Principal::User((*n).to_string())).collect()
    }

    #[test]
    fn splits_on_delimiter_and_ignores_absent_columns() {
        let resolver = AclResolver::new("select", ",");
        let row = Row::from_pairs([("GSA_PERMIT_USERS", Value::Text("alice,bob".into()))]);
        let mut acl = Acl::default();
        resolver.accumulate(&mut acl, &row);

        assert_eq!(acl.permit_users(), &users(&["alice", "bob"]));
        assert!(acl.deny_groups().is_empty());
        assert!(acl.deny_users().is_empty());
        assert!(acl.permit_groups().is_empty());
    }

    #[test]
    fn empty_delimiter_keeps_value_whole() {
        let resolver = AclResolver::new("select", "");
        assert_eq!(resolver.split_principals("alice,bob"), vec!["alice,bob"]);
    }

    #[test]
    fn tokens_are_trimmed_and_blanks_dropped() {
        let resolver = AclResolver::new("select", ";");
        assert_eq!(resolver.split_principals(" a ; ;b;"), vec!["a", "b"]);
        assert!(resolver.split_principals("   ").is_empty());
    }

    #[test]
    fn null_values_contribute_nothing() {
        let resolver = AclResolver::new("select", ",");
        let row = Row::from_pairs([
            ("GSA_PERMIT_GROUPS", Value::Null),
            ("GSA_DENY_USERS", Value::Text("  ".into())),
        ]);
        let mut acl = Acl::default();
        resolver.accumulate(&mut acl, &row);
        assert!(acl.is_empty());
    }

    #[test]
    fn rows_are_unioned() {
        let resolver = AclResolver::new("select", ",");
        let mut acl = Acl::default();
        resolver.accumulate(
            &mut acl,
            &Row::from_pairs([("GSA_PERMIT_USERS", Value::Text("alice".into()))]),
        );
        resolver.accumulate(
            &mut acl,
            &Row::from_pairs([
                ("GSA_PERMIT_USERS", Value::Text("bob, alice".into())),
                ("GSA_PERMIT_GROUPS", Value::Text("eng".into())),
            ]),
        );
        assert_eq!(acl.permit_users(), &users(&["alice", "bob"]));
        assert!(acl.permit_groups().contains(&Principal::Group("eng".into())));
    }

    #[test]
    fn empty_result_follows_policy() {
        assert_eq!(AclLookup::NoRows.into_acl(AclEmptyPolicy::Public), None);
        assert_eq!(
            AclLookup::NoRows.into_acl(AclEmptyPolicy::Restricted),
            Some(Acl::restricted())
        );
    }
}
