//! Security policy value types
//!
//! Field names follow the remote API's JSON shape:
//! `{ "default": "none", "accessControlList": [{ "id": "a@x", "role": "admin" }] }`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Access level granted to callers absent from the ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// No access
    None,
    /// Read-only access
    Viewer,
    /// Read-write access
    Editor,
    /// Full control
    Admin,
    /// A level this tool does not know about
    #[serde(other)]
    Unknown,
}

/// Role held by one ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Resource administrator
    Admin,
    /// Regular user
    User,
    /// Read-only user
    Viewer,
    /// Read-write user
    Editor,
    /// A role this tool does not know about
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
            Role::Viewer => write!(f, "viewer"),
            Role::Editor => write!(f, "editor"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

/// One (identity-address, role) grant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AclEntry {
    /// Contact address of the grantee
    #[serde(rename = "id")]
    pub address: String,
    /// Granted role
    pub role: Role,
}

impl AclEntry {
    /// Create a new entry
    pub fn new(address: impl Into<String>, role: Role) -> Self {
        Self {
            address: address.into(),
            role,
        }
    }
}

/// Stored security policy of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Access for identities not listed in the ACL
    #[serde(rename = "default")]
    pub default_access: AccessLevel,
    /// Explicit grants, owner first
    #[serde(rename = "accessControlList", default)]
    pub acl: Vec<AclEntry>,
}

impl SecurityPolicy {
    /// Addresses present in the ACL, in ACL order
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.acl.iter().map(|entry| entry.address.as_str())
    }

    /// Role granted to `address`, if any
    pub fn role_of(&self, address: &str) -> Option<Role> {
        self.acl
            .iter()
            .find(|entry| entry.address == address)
            .map(|entry| entry.role)
    }

    /// Structural equality ignoring ACL order.
    ///
    /// The remote API may reorder or normalize entries on write, so policies
    /// are compared as a default level plus a set of (address, role) pairs.
    pub fn same_grants(&self, other: &SecurityPolicy) -> bool {
        if self.default_access != other.default_access {
            return false;
        }
        let ours: BTreeSet<&AclEntry> = self.acl.iter().collect();
        let theirs: BTreeSet<&AclEntry> = other.acl.iter().collect();
        ours == theirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(entries: &[(&str, Role)]) -> SecurityPolicy {
        SecurityPolicy {
            default_access: AccessLevel::None,
            acl: entries
                .iter()
                .map(|(address, role)| AclEntry::new(*address, *role))
                .collect(),
        }
    }

    #[test]
    fn same_grants_ignores_order() {
        let a = policy(&[("d@x", Role::Admin), ("a@x", Role::User), ("b@x", Role::User)]);
        let b = policy(&[("b@x", Role::User), ("d@x", Role::Admin), ("a@x", Role::User)]);
        assert!(a.same_grants(&b));
    }

    #[test]
    fn same_grants_detects_role_and_default_changes() {
        let a = policy(&[("d@x", Role::Admin), ("a@x", Role::User)]);
        let role_changed = policy(&[("d@x", Role::Admin), ("a@x", Role::Admin)]);
        assert!(!a.same_grants(&role_changed));

        let mut default_changed = a.clone();
        default_changed.default_access = AccessLevel::Viewer;
        assert!(!a.same_grants(&default_changed));

        let missing = policy(&[("d@x", Role::Admin)]);
        assert!(!a.same_grants(&missing));
    }

    #[test]
    fn wire_shape_matches_remote_api() {
        let json = r#"{"default":"none","accessControlList":[{"id":"d@x","role":"admin"},{"id":"a@x","role":"reader"}]}"#;
        let parsed: SecurityPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.default_access, AccessLevel::None);
        assert_eq!(parsed.role_of("d@x"), Some(Role::Admin));
        assert_eq!(parsed.role_of("a@x"), Some(Role::Unknown));

        let encoded = serde_json::to_value(&parsed).unwrap();
        assert_eq!(encoded["accessControlList"][0]["id"], "d@x");
        assert_eq!(encoded["default"], "none");
    }
}
