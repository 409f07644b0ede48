//! Hierarchy fixtures for the mock resource API

use rbac_core::{ResourceRef, SecurityPolicy};

/// An organization and its workspaces
#[derive(Debug, Clone)]
pub struct OrganizationFixture {
    /// The organization itself
    pub resource: ResourceRef,
    /// Child workspaces, in listing order
    pub workspaces: Vec<WorkspaceFixture>,
}

/// A workspace and its scenarios
#[derive(Debug, Clone)]
pub struct WorkspaceFixture {
    /// The workspace itself
    pub resource: ResourceRef,
    /// Child scenarios, in listing order
    pub scenarios: Vec<ResourceRef>,
}

/// Organization `id` owned by `owner_id`
pub fn organization(id: &str, owner_id: &str) -> OrganizationFixture {
    OrganizationFixture {
        resource: ResourceRef::new(id, format!("Organization {id}"), owner_id),
        workspaces: Vec::new(),
    }
}

/// Workspace `id` owned by `owner_id`
pub fn workspace(id: &str, owner_id: &str) -> WorkspaceFixture {
    WorkspaceFixture {
        resource: ResourceRef::new(id, format!("Workspace {id}"), owner_id),
        scenarios: Vec::new(),
    }
}

impl OrganizationFixture {
    /// Append a workspace
    pub fn workspace(mut self, workspace: WorkspaceFixture) -> Self {
        self.workspaces.push(workspace);
        self
    }

    /// Give the organization a stored policy
    pub fn with_policy(mut self, policy: SecurityPolicy) -> Self {
        self.resource.existing_policy = Some(policy);
        self
    }
}

impl WorkspaceFixture {
    /// Append a scenario owned by `owner_id`
    pub fn scenario(mut self, id: &str, owner_id: &str) -> Self {
        self.scenarios
            .push(ResourceRef::new(id, format!("Scenario {id}"), owner_id));
        self
    }

    /// Append a scenario that already carries a policy
    pub fn scenario_with_policy(mut self, id: &str, owner_id: &str, policy: SecurityPolicy) -> Self {
        self.scenarios.push(
            ResourceRef::new(id, format!("Scenario {id}"), owner_id).with_policy(policy),
        );
        self
    }

    /// Give the workspace a stored policy
    pub fn with_policy(mut self, policy: SecurityPolicy) -> Self {
        self.resource.existing_policy = Some(policy);
        self
    }
}
