//! Collaborator interfaces consumed by the engine
//!
//! Production handlers live in `rbac-effects` (HTTP); deterministic in-memory
//! handlers live in `rbac-testkit`. The engine awaits every call in sequence,
//! so implementations never see concurrent requests from one run.

use crate::errors::{DirectoryError, RemoteError};
use crate::policy::SecurityPolicy;
use crate::resource::{ResourcePath, ResourceRef};
use async_trait::async_trait;

/// Remote resource API
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Every organization visible to the caller
    async fn list_organizations(&self) -> Result<Vec<ResourceRef>, RemoteError>;

    /// A single organization by id
    async fn get_organization(&self, organization_id: &str) -> Result<ResourceRef, RemoteError>;

    /// Workspaces of an organization
    async fn list_workspaces(&self, organization_id: &str)
        -> Result<Vec<ResourceRef>, RemoteError>;

    /// Scenarios of a workspace
    async fn list_scenarios(
        &self,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<ResourceRef>, RemoteError>;

    /// Replace the stored policy of a resource.
    ///
    /// Returns the resource as stored after the call; its `existing_policy`
    /// is what the caller compares against the intended policy.
    async fn update_policy(
        &self,
        path: &ResourcePath,
        policy: &SecurityPolicy,
    ) -> Result<ResourceRef, RemoteError>;
}

/// Entry returned by a directory lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Directory object id
    pub oid: String,
    /// Contact address
    pub mail: String,
    /// Human-readable name
    pub display_name: String,
}

/// Directory service resolving identity references to contact addresses
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Look up `oid`; `Ok(None)` when the directory does not know it
    async fn lookup_identity(&self, oid: &str) -> Result<Option<DirectoryUser>, DirectoryError>;
}

#[async_trait]
impl<T: ResourceApi + ?Sized> ResourceApi for &T {
    async fn list_organizations(&self) -> Result<Vec<ResourceRef>, RemoteError> {
        (**self).list_organizations().await
    }

    async fn get_organization(&self, organization_id: &str) -> Result<ResourceRef, RemoteError> {
        (**self).get_organization(organization_id).await
    }

    async fn list_workspaces(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ResourceRef>, RemoteError> {
        (**self).list_workspaces(organization_id).await
    }

    async fn list_scenarios(
        &self,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<ResourceRef>, RemoteError> {
        (**self).list_scenarios(organization_id, workspace_id).await
    }

    async fn update_policy(
        &self,
        path: &ResourcePath,
        policy: &SecurityPolicy,
    ) -> Result<ResourceRef, RemoteError> {
        (**self).update_policy(path, policy).await
    }
}

#[async_trait]
impl<T: DirectoryService + ?Sized> DirectoryService for &T {
    async fn lookup_identity(&self, oid: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        (**self).lookup_identity(oid).await
    }
}
