//! Managed resources: organizations contain workspaces, workspaces contain scenarios

use crate::policy::SecurityPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level of a resource in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Traversal root
    Organization,
    /// Child of an organization
    Workspace,
    /// Leaf, child of a workspace
    Scenario,
}

impl ResourceKind {
    /// Lowercase label used in logs and the audit report
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Organization => "organization",
            ResourceKind::Workspace => "workspace",
            ResourceKind::Scenario => "scenario",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource as returned by the remote API.
///
/// Fetched fresh at each traversal step and dropped once processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    /// Identifier, unique within the parent scope
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Opaque owner identity reference
    #[serde(default)]
    pub owner_id: String,
    /// Policy already stored remotely
    #[serde(rename = "security", default, skip_serializing_if = "Option::is_none")]
    pub existing_policy: Option<SecurityPolicy>,
}

impl ResourceRef {
    /// Create a resource with no stored policy
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            existing_policy: None,
        }
    }

    /// Attach a stored policy
    pub fn with_policy(mut self, policy: SecurityPolicy) -> Self {
        self.existing_policy = Some(policy);
        self
    }
}

/// Fully-qualified address of a resource on the remote API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourcePath {
    /// `/organizations/{organization_id}`
    Organization {
        /// Organization id
        organization_id: String,
    },
    /// `/organizations/{organization_id}/workspaces/{workspace_id}`
    Workspace {
        /// Parent organization id
        organization_id: String,
        /// Workspace id
        workspace_id: String,
    },
    /// `/organizations/{organization_id}/workspaces/{workspace_id}/scenarios/{scenario_id}`
    Scenario {
        /// Parent organization id
        organization_id: String,
        /// Parent workspace id
        workspace_id: String,
        /// Scenario id
        scenario_id: String,
    },
}

impl ResourcePath {
    /// Path of an organization
    pub fn organization(organization_id: impl Into<String>) -> Self {
        Self::Organization {
            organization_id: organization_id.into(),
        }
    }

    /// Path of a workspace
    pub fn workspace(organization_id: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self::Workspace {
            organization_id: organization_id.into(),
            workspace_id: workspace_id.into(),
        }
    }

    /// Path of a scenario
    pub fn scenario(
        organization_id: impl Into<String>,
        workspace_id: impl Into<String>,
        scenario_id: impl Into<String>,
    ) -> Self {
        Self::Scenario {
            organization_id: organization_id.into(),
            workspace_id: workspace_id.into(),
            scenario_id: scenario_id.into(),
        }
    }

    /// Level addressed by this path
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourcePath::Organization { .. } => ResourceKind::Organization,
            ResourcePath::Workspace { .. } => ResourceKind::Workspace,
            ResourcePath::Scenario { .. } => ResourceKind::Scenario,
        }
    }

    /// Id of the addressed resource itself
    pub fn resource_id(&self) -> &str {
        match self {
            ResourcePath::Organization { organization_id } => organization_id,
            ResourcePath::Workspace { workspace_id, .. } => workspace_id,
            ResourcePath::Scenario { scenario_id, .. } => scenario_id,
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourcePath::Organization { organization_id } => {
                write!(f, "/organizations/{organization_id}")
            }
            ResourcePath::Workspace {
                organization_id,
                workspace_id,
            } => write!(
                f,
                "/organizations/{organization_id}/workspaces/{workspace_id}"
            ),
            ResourcePath::Scenario {
                organization_id,
                workspace_id,
                scenario_id,
            } => write!(
                f,
                "/organizations/{organization_id}/workspaces/{workspace_id}/scenarios/{scenario_id}"
            ),
        }
    }
}
