//! Identity resolution: owner reference → contact address
//!
//! Resolution order is seed/cache, then the directory service (when enabled),
//! then the configured fallback administrator. Only directory hits are cached;
//! unknown identities are looked up again on every call.

use crate::effects::{DirectoryService, DirectoryUser};
use crate::errors::{DirectoryError, ResolveError};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Run-scoped oid → mail cache, seeded from configuration.
///
/// Append-only: an oid, once mapped, keeps its first address.
#[derive(Debug, Clone, Default)]
pub struct IdentityMapping {
    entries: HashMap<String, String>,
}

impl IdentityMapping {
    /// Empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping pre-populated from static configuration
    pub fn seeded<I, K, V>(seed: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut mapping = Self::new();
        for (oid, mail) in seed {
            mapping.insert(oid, mail);
        }
        mapping
    }

    /// Cached address for `oid`
    pub fn get(&self, oid: &str) -> Option<&str> {
        self.entries.get(oid).map(String::as_str)
    }

    /// Record `oid → mail`; returns false if `oid` was already mapped
    pub fn insert(&mut self, oid: impl Into<String>, mail: impl Into<String>) -> bool {
        let oid = oid.into();
        if self.entries.contains_key(&oid) {
            return false;
        }
        self.entries.insert(oid, mail.into());
        true
    }

    /// Whether `oid` is mapped
    pub fn contains(&self, oid: &str) -> bool {
        self.entries.contains_key(oid)
    }

    /// Number of mapped identities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Directory placeholder for runs with lookups disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDirectory;

#[async_trait]
impl DirectoryService for NoDirectory {
    async fn lookup_identity(&self, _oid: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        Ok(None)
    }
}

/// Resolves owner identities, owning the run's [`IdentityMapping`]
#[derive(Debug)]
pub struct IdentityResolver<D> {
    mapping: IdentityMapping,
    directory: Option<D>,
    fallback_address: String,
}

impl<D: DirectoryService> IdentityResolver<D> {
    /// Create a resolver. `directory = None` disables directory lookups.
    pub fn new(
        mapping: IdentityMapping,
        directory: Option<D>,
        fallback_address: impl Into<String>,
    ) -> Self {
        Self {
            mapping,
            directory,
            fallback_address: fallback_address.into(),
        }
    }

    /// Current cache contents
    pub fn mapping(&self) -> &IdentityMapping {
        &self.mapping
    }

    /// Configured fallback administrator address
    pub fn fallback_address(&self) -> &str {
        &self.fallback_address
    }

    /// Whether directory lookups are enabled
    pub fn directory_enabled(&self) -> bool {
        self.directory.is_some()
    }

    /// Resolve `oid` to a contact address.
    ///
    /// Misses degrade to the fallback address. An error is returned only when
    /// the address every step produced is blank.
    pub async fn resolve(&mut self, oid: &str) -> Result<String, ResolveError> {
        let mail = match self.mapping.get(oid) {
            Some(cached) => {
                debug!(oid, "Identity found in mapping");
                cached.to_string()
            }
            None => match self.lookup(oid).await {
                Some(mail) => mail,
                None => {
                    info!(
                        oid,
                        fallback = %self.fallback_address,
                        "Cannot find user in mapping, falling back to admin"
                    );
                    self.fallback_address.clone()
                }
            },
        };

        if mail.trim().is_empty() {
            error!(oid, "Bad mail info provided");
            return Err(ResolveError::BlankAddress {
                oid: oid.to_string(),
            });
        }
        debug!(oid, mail = %mail, "Resolved identity");
        Ok(mail)
    }

    async fn lookup(&mut self, oid: &str) -> Option<String> {
        if oid.trim().is_empty() {
            warn!("Blank owner reference, directory not consulted");
            return None;
        }
        let Some(directory) = self.directory.as_ref() else {
            info!(oid, "User not found and directory lookup disabled");
            return None;
        };

        match directory.lookup_identity(oid).await {
            Ok(Some(user)) if !user.mail.trim().is_empty() => {
                info!(
                    oid = %user.oid,
                    mail = %user.mail,
                    display_name = %user.display_name,
                    "Adding user from directory"
                );
                self.mapping.insert(oid, user.mail.clone());
                Some(user.mail)
            }
            Ok(Some(_)) => {
                warn!(oid, "Directory entry has no usable address");
                None
            }
            Ok(None) => {
                info!(oid, "User not found in directory");
                None
            }
            Err(err) => {
                warn!(oid, error = %err, "Directory lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_append_only() {
        let mut mapping = IdentityMapping::seeded([("oid-1", "first@x")]);
        assert!(!mapping.insert("oid-1", "second@x"));
        assert_eq!(mapping.get("oid-1"), Some("first@x"));
        assert!(mapping.insert("oid-2", "other@x"));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn seeded_entry_wins_without_directory() {
        let mut resolver = IdentityResolver::<NoDirectory>::new(
            IdentityMapping::seeded([("oid-1", "owner@x")]),
            None,
            "admin@x",
        );
        let mail = tokio_test::block_on(resolver.resolve("oid-1")).unwrap();
        assert_eq!(mail, "owner@x");
    }

    #[test]
    fn unknown_identity_uses_fallback_and_is_not_cached() {
        let mut resolver =
            IdentityResolver::new(IdentityMapping::new(), Some(NoDirectory), "admin@x");
        let mail = tokio_test::block_on(resolver.resolve("ghost")).unwrap();
        assert_eq!(mail, "admin@x");
        assert!(!resolver.mapping().contains("ghost"));
    }

    #[test]
    fn blank_owner_reference_goes_straight_to_fallback() {
        let mut resolver =
            IdentityResolver::new(IdentityMapping::new(), Some(NoDirectory), "admin@x");
        assert!(resolver.directory_enabled());
        let mail = tokio_test::block_on(resolver.resolve(" ")).unwrap();
        assert_eq!(mail, "admin@x");
        assert!(resolver.mapping().is_empty());
    }

    #[test]
    fn blank_seed_address_is_a_configuration_error() {
        let mut resolver = IdentityResolver::<NoDirectory>::new(
            IdentityMapping::seeded([("oid-1", "  ")]),
            None,
            "admin@x",
        );
        let err = tokio_test::block_on(resolver.resolve("oid-1")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::BlankAddress {
                oid: "oid-1".to_string()
            }
        );
    }
}
