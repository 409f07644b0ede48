//! In-memory remote resource API
//!
//! Models the platform's "policy already set" behaviour: the first update of a
//! resource stores the policy, later updates leave the stored policy untouched
//! and echo it back. [`MockResourceApi::overwrite_on_store`] switches to a
//! platform that replaces whatever is stored.
//!
//! # Blocking Lock Usage
//!
//! Uses `std::sync::Mutex`; no lock is held across an await point.

use crate::fixtures::{OrganizationFixture, WorkspaceFixture};
use async_trait::async_trait;
use rbac_core::{RemoteError, ResourceApi, ResourcePath, ResourceRef, SecurityPolicy};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// One call observed by the mock, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `list_organizations`
    ListOrganizations,
    /// `get_organization(id)`
    GetOrganization(String),
    /// `list_workspaces(organization)`
    ListWorkspaces(String),
    /// `list_scenarios(organization, workspace)`
    ListScenarios(String, String),
    /// `update_policy(path)`
    UpdatePolicy(ResourcePath),
}

#[derive(Debug, Default)]
struct MockState {
    organizations: Vec<OrganizationFixture>,
    failing_listings: HashSet<ResourcePath>,
    failing_updates: HashSet<ResourcePath>,
    fail_root: bool,
    reorder_on_store: bool,
    overwrite_on_store: bool,
    calls: Vec<ApiCall>,
}

/// Deterministic [`ResourceApi`] over a fixed hierarchy
#[derive(Debug, Clone, Default)]
pub struct MockResourceApi {
    state: Arc<Mutex<MockState>>,
}

impl MockResourceApi {
    /// Empty platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an organization (and its subtree)
    pub fn with_organization(self, organization: OrganizationFixture) -> Self {
        self.state().organizations.push(organization);
        self
    }

    /// Make `list_organizations` fail
    pub fn fail_root_listing(self) -> Self {
        self.state().fail_root = true;
        self
    }

    /// Make listing the workspaces of `organization_id` fail
    pub fn fail_workspace_listing(self, organization_id: &str) -> Self {
        self.state()
            .failing_listings
            .insert(ResourcePath::organization(organization_id));
        self
    }

    /// Make listing the scenarios of a workspace fail
    pub fn fail_scenario_listing(self, organization_id: &str, workspace_id: &str) -> Self {
        self.state()
            .failing_listings
            .insert(ResourcePath::workspace(organization_id, workspace_id));
        self
    }

    /// Make updates of `path` fail
    pub fn fail_update(self, path: ResourcePath) -> Self {
        self.state().failing_updates.insert(path);
        self
    }

    /// Store ACLs reversed, as a server that normalizes entry order would
    pub fn reorder_on_store(self) -> Self {
        self.state().reorder_on_store = true;
        self
    }

    /// Replace stored policies on every update instead of keeping the first
    pub fn overwrite_on_store(self) -> Self {
        self.state().overwrite_on_store = true;
        self
    }

    /// Policy currently stored for `path`
    pub fn stored_policy(&self, path: &ResourcePath) -> Option<SecurityPolicy> {
        let state = self.state();
        find(&state.organizations, path).and_then(|resource| resource.existing_policy.clone())
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    /// Paths updated so far, in order
    pub fn updated_paths(&self) -> Vec<ResourcePath> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::UpdatePolicy(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock means a test already panicked
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn find<'a>(organizations: &'a [OrganizationFixture], path: &ResourcePath) -> Option<&'a ResourceRef> {
    match path {
        ResourcePath::Organization { organization_id } => organizations
            .iter()
            .find(|o| &o.resource.id == organization_id)
            .map(|o| &o.resource),
        ResourcePath::Workspace {
            organization_id,
            workspace_id,
        } => find_workspace(organizations, organization_id, workspace_id).map(|w| &w.resource),
        ResourcePath::Scenario {
            organization_id,
            workspace_id,
            scenario_id,
        } => find_workspace(organizations, organization_id, workspace_id)
            .and_then(|w| w.scenarios.iter().find(|s| &s.id == scenario_id)),
    }
}

fn find_workspace<'a>(
    organizations: &'a [OrganizationFixture],
    organization_id: &str,
    workspace_id: &str,
) -> Option<&'a WorkspaceFixture> {
    organizations
        .iter()
        .find(|o| o.resource.id == organization_id)
        .and_then(|o| o.workspaces.iter().find(|w| w.resource.id == workspace_id))
}

fn find_mut<'a>(
    organizations: &'a mut [OrganizationFixture],
    path: &ResourcePath,
) -> Option<&'a mut ResourceRef> {
    match path {
        ResourcePath::Organization { organization_id } => organizations
            .iter_mut()
            .find(|o| &o.resource.id == organization_id)
            .map(|o| &mut o.resource),
        ResourcePath::Workspace {
            organization_id,
            workspace_id,
        } => organizations
            .iter_mut()
            .find(|o| &o.resource.id == organization_id)
            .and_then(|o| o.workspaces.iter_mut().find(|w| &w.resource.id == workspace_id))
            .map(|w| &mut w.resource),
        ResourcePath::Scenario {
            organization_id,
            workspace_id,
            scenario_id,
        } => organizations
            .iter_mut()
            .find(|o| &o.resource.id == organization_id)
            .and_then(|o| o.workspaces.iter_mut().find(|w| &w.resource.id == workspace_id))
            .and_then(|w| w.scenarios.iter_mut().find(|s| &s.id == scenario_id)),
    }
}

#[async_trait]
impl ResourceApi for MockResourceApi {
    async fn list_organizations(&self) -> Result<Vec<ResourceRef>, RemoteError> {
        let mut state = self.state();
        state.calls.push(ApiCall::ListOrganizations);
        if state.fail_root {
            return Err(RemoteError::status(503, "organizations unavailable"));
        }
        Ok(state
            .organizations
            .iter()
            .map(|o| o.resource.clone())
            .collect())
    }

    async fn get_organization(&self, organization_id: &str) -> Result<ResourceRef, RemoteError> {
        let mut state = self.state();
        state
            .calls
            .push(ApiCall::GetOrganization(organization_id.to_string()));
        state
            .organizations
            .iter()
            .find(|o| o.resource.id == organization_id)
            .map(|o| o.resource.clone())
            .ok_or_else(|| RemoteError::not_found(format!("organization {organization_id}")))
    }

    async fn list_workspaces(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ResourceRef>, RemoteError> {
        let mut state = self.state();
        state
            .calls
            .push(ApiCall::ListWorkspaces(organization_id.to_string()));
        if state
            .failing_listings
            .contains(&ResourcePath::organization(organization_id))
        {
            return Err(RemoteError::status(500, "workspace listing failed"));
        }
        state
            .organizations
            .iter()
            .find(|o| o.resource.id == organization_id)
            .map(|o| o.workspaces.iter().map(|w| w.resource.clone()).collect())
            .ok_or_else(|| RemoteError::not_found(format!("organization {organization_id}")))
    }

    async fn list_scenarios(
        &self,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<ResourceRef>, RemoteError> {
        let mut state = self.state();
        state.calls.push(ApiCall::ListScenarios(
            organization_id.to_string(),
            workspace_id.to_string(),
        ));
        if state
            .failing_listings
            .contains(&ResourcePath::workspace(organization_id, workspace_id))
        {
            return Err(RemoteError::status(500, "scenario listing failed"));
        }
        find_workspace(&state.organizations, organization_id, workspace_id)
            .map(|w| w.scenarios.clone())
            .ok_or_else(|| RemoteError::not_found(format!("workspace {workspace_id}")))
    }

    async fn update_policy(
        &self,
        path: &ResourcePath,
        policy: &SecurityPolicy,
    ) -> Result<ResourceRef, RemoteError> {
        let mut state = self.state();
        state.calls.push(ApiCall::UpdatePolicy(path.clone()));
        if state.failing_updates.contains(path) {
            return Err(RemoteError::network(format!("update of {path} timed out")));
        }

        let reorder = state.reorder_on_store;
        let overwrite = state.overwrite_on_store;
        let resource = find_mut(&mut state.organizations, path)
            .ok_or_else(|| RemoteError::not_found(path.to_string()))?;
        if overwrite || resource.existing_policy.is_none() {
            let mut stored = policy.clone();
            if reorder {
                stored.acl.reverse();
            }
            resource.existing_policy = Some(stored);
        }
        Ok(resource.clone())
    }
}
