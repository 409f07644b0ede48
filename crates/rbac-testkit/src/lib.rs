//! RBAC Testkit - deterministic collaborators for the migration engine
//!
//! - [`MockResourceApi`]: fixed hierarchy, scripted listing and update
//!   failures, and the platform's "policy already set" behaviour
//! - [`MockDirectory`]: identity lookups with per-oid counters
//! - [`MemoryAuditSink`]: records kept in memory
//! - [`fixtures`]: builders for organizations, workspaces and scenarios

#![forbid(unsafe_code)]

pub mod directory;
pub mod fixtures;
pub mod resource_api;
pub mod sink;

pub use directory::MockDirectory;
pub use fixtures::{organization, workspace, OrganizationFixture, WorkspaceFixture};
pub use resource_api::{ApiCall, MockResourceApi};
pub use sink::MemoryAuditSink;

use rbac_core::{AccessLevel, AclEntry, Role, SecurityPolicy};

/// Policy with the given `(address, role)` grants and default access `none`
pub fn policy(entries: &[(&str, Role)]) -> SecurityPolicy {
    SecurityPolicy {
        default_access: AccessLevel::None,
        acl: entries
            .iter()
            .map(|(address, role)| AclEntry::new(*address, *role))
            .collect(),
    }
}
