//! Depth-first traversal: organization → workspace → scenario
//!
//! Selection runs top-down, identity aggregation bottom-up: a parent's policy
//! is written only after every child has been processed, because the child
//! owners it collects become the parent's `user` grants.

use super::applier::{ApplyRequest, PolicyApplier};
use super::summary::RunSummary;
use crate::acl::{build_policy, ContributionSet};
use crate::audit::AuditSink;
use crate::config::{validate_organization_id, Selection};
use crate::effects::{DirectoryService, ResourceApi};
use crate::errors::{MigrationError, RemoteError, Result};
use crate::identity::IdentityResolver;
use crate::policy::SecurityPolicy;
use crate::resource::{ResourceKind, ResourcePath, ResourceRef};
use tracing::{debug, error, info};

/// Children of one resource, or the reason they could not be listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildListing {
    /// Listing succeeded
    Listed(Vec<ResourceRef>),
    /// Listing failed; the branch proceeds as if it had no children
    Degraded(RemoteError),
}

impl ChildListing {
    /// Children to visit; empty when degraded
    pub fn into_children(self) -> Vec<ResourceRef> {
        match self {
            ChildListing::Listed(children) => children,
            ChildListing::Degraded(_) => Vec::new(),
        }
    }

    /// Whether the listing failed
    pub fn is_degraded(&self) -> bool {
        matches!(self, ChildListing::Degraded(_))
    }
}

/// Drives one migration run over the resource hierarchy
pub struct HierarchyWalker<'r, A, D, S> {
    api: A,
    resolver: &'r mut IdentityResolver<D>,
    sink: S,
    trace_documents: bool,
    summary: RunSummary,
}

impl<'r, A, D, S> HierarchyWalker<'r, A, D, S>
where
    A: ResourceApi,
    D: DirectoryService,
    S: AuditSink,
{
    /// Walker writing to `sink` and resolving owners through `resolver`
    pub fn new(api: A, resolver: &'r mut IdentityResolver<D>, sink: S) -> Self {
        Self {
            api,
            resolver,
            sink,
            trace_documents: false,
            summary: RunSummary::default(),
        }
    }

    /// Log every listing result at debug level
    pub fn with_trace_documents(mut self, enabled: bool) -> Self {
        self.trace_documents = enabled;
        self
    }

    /// Migrate the selected organizations and close the audit sink.
    ///
    /// Fails only when the root listing fails, the selection is malformed or
    /// the audit sink cannot be written. Every other failure degrades the
    /// affected branch and the run continues.
    pub async fn run(mut self, selection: &Selection) -> Result<RunSummary> {
        info!("Migration start");

        let organizations = match selection {
            Selection::All => {
                info!("Migrating organizations");
                let organizations = self
                    .api
                    .list_organizations()
                    .await
                    .map_err(MigrationError::RootListing)?;
                self.trace(ResourceKind::Organization, "all", &organizations);
                organizations
            }
            Selection::Organization(id) => {
                validate_organization_id(id)?;
                info!(organization_id = %id, "Migrating single organization");
                let organization = self
                    .api
                    .get_organization(id)
                    .await
                    .map_err(MigrationError::RootListing)?;
                vec![organization]
            }
        };

        for organization in organizations {
            self.migrate_organization(organization).await?;
        }

        self.sink.close()?;
        self.summary.cached_identities = self.resolver.mapping().len();
        info!(summary = %self.summary, "Migration complete");
        Ok(self.summary)
    }

    async fn migrate_organization(&mut self, organization: ResourceRef) -> Result<()> {
        info!(
            organization_id = %organization.id,
            name = %organization.name,
            "Migrating organization"
        );

        info!(organization_id = %organization.id, "Migrating workspaces");
        let listing = self.list_workspaces(&organization.id).await;
        let mut users = ContributionSet::new();
        for workspace in listing.into_children() {
            if let Some(contribution) = self.migrate_workspace(&organization.id, workspace).await? {
                users.extend(contribution);
            }
        }

        let path = ResourcePath::organization(&organization.id);
        self.apply_aggregated(
            &path,
            &organization.owner_id,
            organization.existing_policy.as_ref(),
            users,
        )
        .await?;
        Ok(())
    }

    async fn migrate_workspace(
        &mut self,
        organization_id: &str,
        workspace: ResourceRef,
    ) -> Result<Option<ContributionSet>> {
        info!(
            workspace_id = %workspace.id,
            name = %workspace.name,
            "Migrating workspace"
        );

        let listing = self.list_scenarios(organization_id, &workspace.id).await;
        let mut users = ContributionSet::new();
        for scenario in listing.into_children() {
            if let Some(mail) = self
                .migrate_scenario(organization_id, &workspace.id, scenario)
                .await?
            {
                users.insert(mail);
            }
        }
        debug!(workspace_id = %workspace.id, owners = ?users.to_vec(), "Scenario owners");

        let path = ResourcePath::workspace(organization_id, &workspace.id);
        self.apply_aggregated(
            &path,
            &workspace.owner_id,
            workspace.existing_policy.as_ref(),
            users,
        )
        .await
    }

    async fn migrate_scenario(
        &mut self,
        organization_id: &str,
        workspace_id: &str,
        scenario: ResourceRef,
    ) -> Result<Option<String>> {
        info!(
            scenario_id = %scenario.id,
            name = %scenario.name,
            owner_id = %scenario.owner_id,
            "Scenario"
        );

        let owner_mail = self.resolve_owner(&scenario.owner_id).await;
        let policy = build_policy(&owner_mail, None);
        let path = ResourcePath::scenario(organization_id, workspace_id, &scenario.id);
        let applied = PolicyApplier::new(&self.api)
            .apply(
                &mut self.sink,
                ApplyRequest {
                    path: &path,
                    owner_id: &scenario.owner_id,
                    owner_mail: &owner_mail,
                    contributed: None,
                    policy: &policy,
                    existing: scenario.existing_policy.as_ref(),
                },
            )
            .await?;
        self.summary.record(ResourceKind::Scenario, &applied.outcome);

        if applied.outcome.contributes() && !owner_mail.is_empty() {
            Ok(Some(owner_mail))
        } else {
            Ok(None)
        }
    }

    /// Shared tail of the workspace and organization levels: add the owner
    /// to a non-empty child contribution, build, apply, and hand the combined
    /// set upward.
    async fn apply_aggregated(
        &mut self,
        path: &ResourcePath,
        owner_id: &str,
        existing: Option<&SecurityPolicy>,
        mut users: ContributionSet,
    ) -> Result<Option<ContributionSet>> {
        let owner_mail = self.resolve_owner(owner_id).await;
        let contributed = if users.is_empty() {
            None
        } else {
            users.insert(owner_mail.clone());
            Some(users)
        };

        let policy = build_policy(&owner_mail, contributed.as_ref());
        let applied = PolicyApplier::new(&self.api)
            .apply(
                &mut self.sink,
                ApplyRequest {
                    path,
                    owner_id,
                    owner_mail: &owner_mail,
                    contributed: contributed.as_ref(),
                    policy: &policy,
                    existing,
                },
            )
            .await?;
        self.summary.record(path.kind(), &applied.outcome);

        if applied.outcome.contributes() {
            Ok(contributed)
        } else {
            Ok(None)
        }
    }

    async fn resolve_owner(&mut self, owner_id: &str) -> String {
        match self.resolver.resolve(owner_id).await {
            Ok(mail) => mail,
            Err(err) => {
                error!(owner_id, error = %err, "Owner has no usable address");
                self.summary.unresolved_owners += 1;
                String::new()
            }
        }
    }

    async fn list_workspaces(&mut self, organization_id: &str) -> ChildListing {
        let result = self.api.list_workspaces(organization_id).await;
        self.child_listing(ResourceKind::Workspace, organization_id, result)
    }

    async fn list_scenarios(&mut self, organization_id: &str, workspace_id: &str) -> ChildListing {
        info!(workspace_id, "Migrating scenarios");
        let result = self.api.list_scenarios(organization_id, workspace_id).await;
        self.child_listing(ResourceKind::Scenario, workspace_id, result)
    }

    fn child_listing(
        &mut self,
        kind: ResourceKind,
        parent_id: &str,
        result: std::result::Result<Vec<ResourceRef>, RemoteError>,
    ) -> ChildListing {
        match result {
            Ok(children) => {
                self.trace(kind, parent_id, &children);
                ChildListing::Listed(children)
            }
            Err(err) => {
                error!(
                    kind = %kind,
                    parent_id,
                    error = %err,
                    "Cannot list children, continuing without them"
                );
                self.summary.degraded_listings += 1;
                ChildListing::Degraded(err)
            }
        }
    }

    fn trace(&self, kind: ResourceKind, parent_id: &str, resources: &[ResourceRef]) {
        if self.trace_documents {
            debug!(kind = %kind, parent_id, documents = ?resources, "Listed resources");
        }
    }
}
