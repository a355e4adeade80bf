//! Access-control lists derived from a per-document ACL query
//!
//! The ACL query returns any number of rows. Four reserved columns carry
//! principal names, possibly several per value separated by the configured
//! delimiter. All rows are consumed and unioned; every split token is trimmed
//! and empty tokens are dropped.
//!
//! A query that returns no rows is not an error. What it means for the
//! document is decided by [`AclEmptyPolicy`].

pub mod resolver;

pub use resolver::{AclLookup, AclResolver};

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// A user or group identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Principal {
    User(String),
    Group(String),
}

impl Principal {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::User(name) | Self::Group(name) => name,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(name) => write!(f, "user:{name}"),
            Self::Group(name) => write!(f, "group:{name}"),
        }
    }
}

/// The four reserved principal columns of the ACL query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclColumn {
    PermitUsers,
    DenyUsers,
    PermitGroups,
    DenyGroups,
}

impl AclColumn {
    pub const ALL: [Self; 4] = [
        Self::PermitUsers,
        Self::DenyUsers,
        Self::PermitGroups,
        Self::DenyGroups,
    ];

    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::PermitUsers => "GSA_PERMIT_USERS",
            Self::DenyUsers => "GSA_DENY_USERS",
            Self::PermitGroups => "GSA_PERMIT_GROUPS",
            Self::DenyGroups => "GSA_DENY_GROUPS",
        }
    }

    fn principal(self, name: &str) -> Principal {
        match self {
            Self::PermitUsers | Self::DenyUsers => Principal::User(name.to_string()),
            Self::PermitGroups | Self::DenyGroups => Principal::Group(name.to_string()),
        }
    }
}

/// True for the column names that carry ACL principals
#[must_use]
pub fn is_reserved_column(name: &str) -> bool {
    AclColumn::ALL.iter().any(|c| c.column_name() == name)
}

/// Permit/deny sets of users and groups for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    permit_users: BTreeSet<Principal>,
    deny_users: BTreeSet<Principal>,
    permit_groups: BTreeSet<Principal>,
    deny_groups: BTreeSet<Principal>,
}

impl Acl {
    /// An ACL with no grantees: nobody may see the document
    #[must_use]
    pub fn restricted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn permit_users(&self) -> &BTreeSet<Principal> {
        &self.permit_users
    }

    #[must_use]
    pub fn deny_users(&self) -> &BTreeSet<Principal> {
        &self.deny_users
    }

    #[must_use]
    pub fn permit_groups(&self) -> &BTreeSet<Principal> {
        &self.permit_groups
    }

    #[must_use]
    pub fn deny_groups(&self) -> &BTreeSet<Principal> {
        &self.deny_groups
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        AclColumn::ALL.iter().all(|&c| self.set(c).is_empty())
    }

    /// Add a principal to the set backing `column`
    pub fn insert(&mut self, column: AclColumn, name: &str) -> bool {
        let principal = column.principal(name);
        self.set_mut(column).insert(principal)
    }

    /// Builder-style variant of [`Acl::insert`]
    #[must_use]
    pub fn with(mut self, column: AclColumn, name: &str) -> Self {
        self.insert(column, name);
        self
    }

    #[must_use]
    pub fn set(&self, column: AclColumn) -> &BTreeSet<Principal> {
        match column {
            AclColumn::PermitUsers => &self.permit_users,
            AclColumn::DenyUsers => &self.deny_users,
            AclColumn::PermitGroups => &self.permit_groups,
            AclColumn::DenyGroups => &self.deny_groups,
        }
    }

    fn set_mut(&mut self, column: AclColumn) -> &mut BTreeSet<Principal> {
        match column {
            AclColumn::PermitUsers => &mut self.permit_users,
            AclColumn::DenyUsers => &mut self.deny_users,
            AclColumn::PermitGroups => &mut self.permit_groups,
            AclColumn::DenyGroups => &mut self.deny_groups,
        }
    }
}

/// What a document gets when its ACL query returns no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclEmptyPolicy {
    /// No ACL is attached; the document is public
    #[default]
    Public,
    /// An empty ACL is attached; the document is secure with no grantees
    Restricted,
}

impl AclEmptyPolicy {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "restricted" => Ok(Self::Restricted),
            other => Err(ConfigError::invalid(
                "db.aclEmptyPolicy",
                format!("expected 'public' or 'restricted', found '{other}'"),
            )),
        }
    }
}
