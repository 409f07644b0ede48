//! Update-and-verify of a single resource's policy

use crate::acl::ContributionSet;
use crate::audit::{AuditRecord, AuditSink, AuditStatus};
use crate::effects::ResourceApi;
use crate::errors::{AuditError, RemoteError};
use crate::policy::SecurityPolicy;
use crate::resource::ResourcePath;
use tracing::{debug, error, info, warn};

/// What one update attempt achieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The stored policy now equals the intended one
    Updated,
    /// The resource already carried the intended policy, or the remote kept a
    /// different one
    Exist,
    /// The update or its read-back failed
    Failed(RemoteError),
}

impl ApplyOutcome {
    /// Audit status for this outcome; failures are reported as EXIST
    pub fn status(&self) -> AuditStatus {
        match self {
            ApplyOutcome::Updated => AuditStatus::Updated,
            ApplyOutcome::Exist | ApplyOutcome::Failed(_) => AuditStatus::Exist,
        }
    }

    /// Whether the resource may contribute to its parent
    pub fn contributes(&self) -> bool {
        !matches!(self, ApplyOutcome::Failed(_))
    }
}

/// Everything needed to update one resource
#[derive(Debug, Clone, Copy)]
pub struct ApplyRequest<'a> {
    /// Remote address of the resource
    pub path: &'a ResourcePath,
    /// Owner identity reference
    pub owner_id: &'a str,
    /// Resolved owner address
    pub owner_mail: &'a str,
    /// Set passed to the ACL builder
    pub contributed: Option<&'a ContributionSet>,
    /// Intended policy
    pub policy: &'a SecurityPolicy,
    /// Policy the resource carried when it was listed
    pub existing: Option<&'a SecurityPolicy>,
}

/// Result of [`PolicyApplier::apply`]: the record forwarded to the sink and
/// the outcome behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Record appended to the audit sink
    pub record: AuditRecord,
    /// Outcome of the remote call
    pub outcome: ApplyOutcome,
}

/// Issues policy updates and verifies the stored result
#[derive(Debug)]
pub struct PolicyApplier<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: ResourceApi + ?Sized> PolicyApplier<'a, A> {
    /// Applier over `api`
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Update the policy, compare the read-back, and audit the attempt.
    ///
    /// The outcome is `Updated` when the read-back equals the intended policy
    /// and the resource was not already carrying that same policy when it was
    /// listed; an unchanged resource is `Exist`, as is any read-back that
    /// differs from the intended policy. Remote failures never escape: they
    /// become [`ApplyOutcome::Failed`]. Only a failing audit sink is returned
    /// as an error.
    pub async fn apply<S: AuditSink + ?Sized>(
        &self,
        sink: &mut S,
        request: ApplyRequest<'_>,
    ) -> Result<Applied, AuditError> {
        let path = request.path;
        debug!(resource = %path, acl_entries = request.policy.acl.len(), "Updating security policy");

        let unchanged = request
            .existing
            .is_some_and(|listed| listed.same_grants(request.policy));
        let outcome = match self.api.update_policy(path, request.policy).await {
            Ok(stored) => match stored.existing_policy {
                Some(reported) if reported.same_grants(request.policy) => {
                    if unchanged {
                        info!(resource = %path, "Security policy already in place");
                        ApplyOutcome::Exist
                    } else {
                        info!(resource = %path, "Security policy updated");
                        ApplyOutcome::Updated
                    }
                }
                Some(_) => {
                    warn!(
                        resource = %path,
                        owner = %request.owner_mail,
                        "Resource already has a security policy, left unchanged"
                    );
                    ApplyOutcome::Exist
                }
                None => {
                    warn!(resource = %path, "Update response carried no security policy");
                    ApplyOutcome::Exist
                }
            },
            Err(err) => {
                error!(resource = %path, error = %err, "Failed to update security policy");
                ApplyOutcome::Failed(err)
            }
        };

        let record = AuditRecord::new(
            path.kind(),
            path.resource_id(),
            request.owner_id,
            request.owner_mail,
            outcome.status(),
            request.contributed,
        );
        sink.record(record.clone())?;

        Ok(Applied { record, outcome })
    }
}
