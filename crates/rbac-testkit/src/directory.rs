//! In-memory directory service that counts lookups

use async_trait::async_trait;
use rbac_core::{DirectoryError, DirectoryService, DirectoryUser};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<String, DirectoryUser>,
    unavailable: HashSet<String>,
    lookups: HashMap<String, usize>,
}

/// Deterministic [`DirectoryService`]
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl MockDirectory {
    /// Directory with no users
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `oid` with address `mail`
    pub fn with_user(self, oid: &str, mail: &str) -> Self {
        self.state().users.insert(
            oid.to_string(),
            DirectoryUser {
                oid: oid.to_string(),
                mail: mail.to_string(),
                display_name: format!("User {oid}"),
            },
        );
        self
    }

    /// Make lookups of `oid` fail at the transport level
    pub fn with_outage_for(self, oid: &str) -> Self {
        self.state().unavailable.insert(oid.to_string());
        self
    }

    /// How many times `oid` was looked up
    pub fn lookups(&self, oid: &str) -> usize {
        self.state().lookups.get(oid).copied().unwrap_or(0)
    }

    /// Total lookups across all identities
    pub fn total_lookups(&self) -> usize {
        self.state().lookups.values().sum()
    }

    fn state(&self) -> MutexGuard<'_, DirectoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DirectoryService for MockDirectory {
    async fn lookup_identity(&self, oid: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        let mut state = self.state();
        *state.lookups.entry(oid.to_string()).or_insert(0) += 1;
        if state.unavailable.contains(oid) {
            return Err(DirectoryError::network(format!("directory unreachable for {oid}")));
        }
        Ok(state.users.get(oid).cloned())
    }
}
