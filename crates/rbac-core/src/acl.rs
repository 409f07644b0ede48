//! ACL construction from an owner and the addresses its descendants contribute

use crate::policy::{AccessLevel, AclEntry, Role, SecurityPolicy};
use indexmap::IndexSet;
use tracing::info;

/// De-duplicated set of descendant-owner addresses handed to a parent.
///
/// Keeps first-insertion order so audit rows are reproducible for a given
/// listing order. Blank addresses are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionSet {
    addresses: IndexSet<String>,
}

impl ContributionSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one address; returns false for duplicates and blanks
    pub fn insert(&mut self, address: impl Into<String>) -> bool {
        let address = address.into();
        if address.trim().is_empty() {
            return false;
        }
        self.addresses.insert(address)
    }

    /// Union another set into this one
    pub fn extend(&mut self, other: ContributionSet) {
        self.addresses.extend(other.addresses);
    }

    /// Whether `address` is present
    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    /// Addresses in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }

    /// Number of distinct addresses
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether nothing was contributed
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// `None` for an empty set, matching the "nothing collected" contribution
    pub fn into_contribution(self) -> Option<ContributionSet> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Addresses in first-seen order
    pub fn to_vec(&self) -> Vec<String> {
        self.addresses.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ContributionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ContributionSet::new();
        for address in iter {
            set.insert(address);
        }
        set
    }
}

/// Build the policy for a resource owned by `owner_mail`.
///
/// The owner is always the first entry, with role admin, and appears exactly
/// once. Every other contributed address is granted `user`.
pub fn build_policy(owner_mail: &str, contributed: Option<&ContributionSet>) -> SecurityPolicy {
    let mut acl = vec![AclEntry::new(owner_mail, Role::Admin)];

    match contributed {
        Some(users) => {
            acl.extend(
                users
                    .iter()
                    .filter(|address| *address != owner_mail)
                    .map(|address| AclEntry::new(address, Role::User)),
            );
        }
        None => {
            info!(owner = %owner_mail, "No users to add, ACL holds the owner only");
        }
    }

    SecurityPolicy {
        default_access: AccessLevel::None,
        acl,
    }
}
