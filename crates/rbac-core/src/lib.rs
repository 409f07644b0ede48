//! RBAC Core - security-policy migration engine
//!
//! Converts legacy ownership metadata on a three-level resource hierarchy
//! (organizations → workspaces → scenarios) into explicit security policies:
//! a default access level of `none` plus an ACL in which the owner is admin
//! and every descendant owner is a user.
//!
//! # Components
//!
//! - [`IdentityResolver`]: owner reference → contact address, with a run-scoped
//!   cache, directory lookups and a fallback administrator
//! - [`build_policy`]: ACL construction from an owner and its contribution set
//! - [`HierarchyWalker`]: depth-first traversal with bottom-up aggregation
//! - [`PolicyApplier`]: update-and-verify, reporting `UPDATED` or `EXIST`
//! - [`AuditSink`]: append-only audit trail, with a CSV implementation
//!
//! Remote collaborators are consumed through the [`ResourceApi`] and
//! [`DirectoryService`] traits.

#![forbid(unsafe_code)]

/// ACL construction and contribution sets
pub mod acl;

/// Audit records and sinks
pub mod audit;

/// Static configuration and validation
pub mod config;

/// Collaborator interfaces
pub mod effects;

/// Traversal and update-and-verify
pub mod engine;

/// Error taxonomy
pub mod errors;

/// Identity mapping and resolution
pub mod identity;

/// Security policy value types
pub mod policy;

/// Resource hierarchy types
pub mod resource;

pub use acl::{build_policy, ContributionSet};
pub use audit::{AuditRecord, AuditSink, AuditStatus, CsvAuditSink, REPORT_HEADER};
pub use config::{MigrationConfig, Selection};
pub use effects::{DirectoryService, DirectoryUser, ResourceApi};
pub use engine::{ApplyOutcome, HierarchyWalker, PolicyApplier, RunSummary};
pub use errors::{
    AuditError, ConfigError, DirectoryError, MigrationError, RemoteError, ResolveError, Result,
};
pub use identity::{IdentityMapping, IdentityResolver, NoDirectory};
pub use policy::{AccessLevel, AclEntry, Role, SecurityPolicy};
pub use resource::{ResourceKind, ResourcePath, ResourceRef};
